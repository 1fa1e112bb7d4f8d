//! Meinungscheck polls: entities and storage access. Votes are one per
//! caller per poll.

use chrono::NaiveDateTime;

use crate::db::SqlDb;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: i64,
    pub question: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub id: i64,
    pub poll_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PollVote {
    poll_id: i64,
    option_id: i64,
    user_id: String,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionWithVotes {
    #[serde(flatten)]
    pub option: PollOption,
    pub votes: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollWithDetails {
    #[serde(flatten)]
    pub poll: Poll,
    pub options: Vec<PollOptionWithVotes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_voted_option_id: Option<i64>,
}

/// Loads every poll with its options, per-option vote counts and the option
/// the caller has voted for.
pub async fn list_polls(sql: &SqlDb, user_id: &str) -> Result<Vec<PollWithDetails>, sqlx::Error> {
    let polls = sqlx::query_as::<_, Poll>("SELECT * FROM polls ORDER BY created_at DESC, id DESC")
        .fetch_all(sql.as_ref())
        .await?;
    if polls.is_empty() {
        return Ok(Vec::new());
    }

    let options = sqlx::query_as::<_, PollOption>("SELECT * FROM poll_options ORDER BY id")
        .fetch_all(sql.as_ref())
        .await?;
    let votes =
        sqlx::query_as::<_, PollVote>("SELECT poll_id, option_id, user_id FROM poll_votes")
            .fetch_all(sql.as_ref())
            .await?;

    Ok(polls
        .into_iter()
        .map(|poll| {
            let mut user_voted_option_id = None;
            let options = options
                .iter()
                .filter(|option| option.poll_id == poll.id)
                .map(|option| {
                    let votes_for_option = votes
                        .iter()
                        .filter(|vote| vote.poll_id == poll.id && vote.option_id == option.id)
                        .collect::<Vec<_>>();
                    if votes_for_option.iter().any(|vote| vote.user_id == user_id) {
                        user_voted_option_id = Some(option.id);
                    }
                    PollOptionWithVotes {
                        option: option.clone(),
                        votes: votes_for_option.len() as i64,
                    }
                })
                .collect();
            PollWithDetails {
                poll,
                options,
                user_voted_option_id,
            }
        })
        .collect())
}

pub async fn get_poll(sql: &SqlDb, poll_id: i64) -> Result<Option<Poll>, sqlx::Error> {
    sqlx::query_as::<_, Poll>("SELECT * FROM polls WHERE id = ?")
        .bind(poll_id)
        .fetch_optional(sql.as_ref())
        .await
}

pub async fn has_voted(sql: &SqlDb, poll_id: i64, user_id: &str) -> Result<bool, sqlx::Error> {
    let vote = sqlx::query("SELECT id FROM poll_votes WHERE poll_id = ? AND user_id = ?")
        .bind(poll_id)
        .bind(user_id)
        .fetch_optional(sql.as_ref())
        .await?;
    Ok(vote.is_some())
}

pub async fn record_vote(
    sql: &SqlDb,
    poll_id: i64,
    option_id: i64,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO poll_votes (poll_id, option_id, user_id) VALUES (?, ?, ?)")
        .bind(poll_id)
        .bind(option_id)
        .bind(user_id)
        .execute(sql.as_ref())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::db::init_test_db;
    use crate::seed::seed_database;

    use super::{has_voted, list_polls, record_vote};

    #[tokio::test]
    async fn votes_are_counted_and_attributed_to_the_caller() {
        let sql = init_test_db().await;
        seed_database(&sql).await.expect("seeding should work");

        let polls = list_polls(&sql, "guest_a").await.expect("query should work");
        assert!(!polls.is_empty());
        let poll = &polls[0];
        let option = &poll.options[0].option;
        assert_eq!(poll.options[0].votes, 0);
        assert!(poll.user_voted_option_id.is_none());

        record_vote(&sql, poll.poll.id, option.id, "guest_a")
            .await
            .expect("vote should insert");
        record_vote(&sql, poll.poll.id, option.id, "guest_b")
            .await
            .expect("vote should insert");

        let polls = list_polls(&sql, "guest_a").await.expect("query should work");
        let poll = polls
            .iter()
            .find(|candidate| candidate.poll.id == poll.poll.id)
            .expect("poll should still be listed");
        assert_eq!(poll.options[0].votes, 2);
        assert_eq!(poll.user_voted_option_id, Some(option.id));

        // a different caller sees the counts but no own vote
        let other = list_polls(&sql, "guest_c").await.expect("query should work");
        let other = other
            .iter()
            .find(|candidate| candidate.poll.id == poll.poll.id)
            .expect("poll should still be listed");
        assert!(other.user_voted_option_id.is_none());
    }

    #[tokio::test]
    async fn has_voted_tracks_per_poll_and_user() {
        let sql = init_test_db().await;
        seed_database(&sql).await.expect("seeding should work");

        let polls = list_polls(&sql, "guest_a").await.expect("query should work");
        let poll = &polls[0];
        assert!(!has_voted(&sql, poll.poll.id, "guest_a")
            .await
            .expect("query should work"));
        record_vote(&sql, poll.poll.id, poll.options[0].option.id, "guest_a")
            .await
            .expect("vote should insert");
        assert!(has_voted(&sql, poll.poll.id, "guest_a")
            .await
            .expect("query should work"));
        assert!(!has_voted(&sql, poll.poll.id, "guest_b")
            .await
            .expect("query should work"));
    }
}
