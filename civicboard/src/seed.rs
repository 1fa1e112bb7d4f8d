//! Seeds the database with the German dataset: Wahlkompass quizzes,
//! Meinungscheck polls and current articles. Reseeding clears the previous
//! content first so renamed entries do not pile up.

use tracing::info;

use crate::db::SqlDb;

struct QuizSeed {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    image_url: Option<&'static str>,
    questions: Vec<QuestionSeed>,
}

struct QuestionSeed {
    text: &'static str,
    // option label and the party it leans towards
    options: Vec<(&'static str, &'static str)>,
}

fn question(text: &'static str, options: Vec<(&'static str, &'static str)>) -> QuestionSeed {
    QuestionSeed { text, options }
}

// Stored point weights mirror the label weighting, so both scoring policies
// agree on the seeded data.
fn label_points(text: &str) -> i64 {
    match text {
        "Stimme zu" => 2,
        "Neutral" => 1,
        _ => 0,
    }
}

fn quiz_seeds() -> Vec<QuizSeed> {
    vec![
        QuizSeed {
            title: "Wahlkompass: Kurz & Knapp",
            description: "Die wichtigsten Themen in 10 schnellen Fragen.",
            category: "quick",
            image_url: None,
            questions: vec![
                question(
                    "Sollte Deutschland mehr Geld für die Bundeswehr ausgeben?",
                    vec![
                        ("Stimme zu", "CDU"),
                        ("Stimme nicht zu", "DIE LINKE"),
                        ("Neutral", "SPD"),
                    ],
                ),
                question(
                    "Sollte es ein Tempolimit auf Autobahnen geben?",
                    vec![
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme nicht zu", "FDP"),
                        ("Stimme nicht zu", "CDU"),
                    ],
                ),
                question(
                    "Sollte die Rente mit 67 bleiben?",
                    vec![
                        ("Stimme zu", "FDP"),
                        ("Stimme nicht zu", "DIE LINKE"),
                        ("Stimme nicht zu", "SPD"),
                    ],
                ),
                question(
                    "Sollte Fleisch teurer werden (Fleischsteuer)?",
                    vec![
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme nicht zu", "AfD"),
                        ("Stimme nicht zu", "CDU"),
                    ],
                ),
                question(
                    "Sollte Marihuana legal bleiben?",
                    vec![
                        ("Stimme zu", "FDP"),
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme nicht zu", "CDU"),
                    ],
                ),
                question(
                    "Sollte die Schuldenbremse gelockert werden?",
                    vec![
                        ("Stimme zu", "SPD"),
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme nicht zu", "FDP"),
                    ],
                ),
                question(
                    "Sollte es mehr Videoüberwachung geben?",
                    vec![
                        ("Stimme zu", "CDU"),
                        ("Stimme zu", "AfD"),
                        ("Stimme nicht zu", "DIE LINKE"),
                    ],
                ),
                question(
                    "Sollte Kohlekraft schneller abgeschaltet werden?",
                    vec![
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme nicht zu", "CDU"),
                        ("Stimme nicht zu", "AfD"),
                    ],
                ),
                question(
                    "Sollte das Bürgergeld erhöht werden?",
                    vec![
                        ("Stimme zu", "DIE LINKE"),
                        ("Stimme zu", "SPD"),
                        ("Stimme nicht zu", "CDU"),
                    ],
                ),
                question(
                    "Sollte Deutschland mehr Fachkräfte aus dem Ausland holen?",
                    vec![
                        ("Stimme zu", "FDP"),
                        ("Stimme zu", "SPD"),
                        ("Stimme nicht zu", "AfD"),
                    ],
                ),
            ],
        },
        QuizSeed {
            title: "Wahlkompass: Allgemein",
            description: "Allgemeine politische Orientierung.",
            category: "general",
            image_url: Some("https://images.unsplash.com/photo-1540910419892-f0c74b0e8966"),
            questions: vec![
                question(
                    "Die Steuern für Reiche sollen erhöht werden.",
                    vec![
                        ("Stimme zu", "DIE LINKE"),
                        ("Stimme zu", "SPD"),
                        ("Stimme nicht zu", "FDP"),
                    ],
                ),
                question(
                    "Atomkraft soll wieder genutzt werden.",
                    vec![
                        ("Stimme zu", "AfD"),
                        ("Stimme zu", "CDU"),
                        ("Stimme nicht zu", "GRÜNE"),
                    ],
                ),
                question(
                    "Der Mindestlohn soll auf 15 Euro steigen.",
                    vec![
                        ("Stimme zu", "SPD"),
                        ("Stimme zu", "DIE LINKE"),
                        ("Stimme nicht zu", "FDP"),
                    ],
                ),
                question(
                    "Es soll eine PKW-Maut auf Autobahnen geben.",
                    vec![
                        ("Stimme zu", "CDU"),
                        ("Stimme nicht zu", "GRÜNE"),
                        ("Neutral", "SPD"),
                    ],
                ),
                question(
                    "Kirchensteuern sollen abgeschafft werden.",
                    vec![
                        ("Stimme zu", "FDP"),
                        ("Stimme zu", "DIE LINKE"),
                        ("Stimme nicht zu", "CDU"),
                    ],
                ),
                question(
                    "Es soll ein bedingungsloses Grundeinkommen geben.",
                    vec![
                        ("Stimme zu", "DIE LINKE"),
                        ("Neutral", "GRÜNE"),
                        ("Stimme nicht zu", "CDU"),
                    ],
                ),
                question(
                    "Die Bundeswehr soll im Inneren eingesetzt werden dürfen.",
                    vec![
                        ("Stimme zu", "AfD"),
                        ("Stimme zu", "CDU"),
                        ("Stimme nicht zu", "DIE LINKE"),
                    ],
                ),
                question(
                    "Flugreisen sollen höher besteuert werden.",
                    vec![
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme zu", "SPD"),
                        ("Stimme nicht zu", "AfD"),
                    ],
                ),
                question(
                    "Das Bargeld soll erhalten bleiben.",
                    vec![
                        ("Stimme zu", "AfD"),
                        ("Stimme zu", "FDP"),
                        ("Neutral", "CDU"),
                    ],
                ),
                question(
                    "Es soll eine allgemeine Dienstpflicht geben.",
                    vec![
                        ("Stimme zu", "CDU"),
                        ("Stimme zu", "AfD"),
                        ("Stimme nicht zu", "FDP"),
                    ],
                ),
            ],
        },
        QuizSeed {
            title: "Wahlkompass: Junior",
            description: "Einfach erklärt für Kinder und Jugendliche.",
            category: "junior",
            image_url: Some("https://images.unsplash.com/photo-1509062522246-3755977927d7"),
            questions: vec![
                question(
                    "Sollte es mehr Spielplätze in deiner Stadt geben?",
                    vec![
                        ("Stimme zu", "SPD"),
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme nicht zu", "FDP"),
                    ],
                ),
                question(
                    "Sollten Schulen moderner ausgestattet werden (z.B. Tablets für alle)?",
                    vec![
                        ("Stimme zu", "FDP"),
                        ("Stimme zu", "CDU"),
                        ("Neutral", "SPD"),
                    ],
                ),
                question(
                    "Sollten Busse und Bahnen für Schüler kostenlos sein?",
                    vec![
                        ("Stimme zu", "DIE LINKE"),
                        ("Stimme zu", "SPD"),
                        ("Stimme nicht zu", "FDP"),
                    ],
                ),
                question(
                    "Sollte Plastikspielzeug verboten werden?",
                    vec![
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme nicht zu", "AfD"),
                        ("Neutral", "CDU"),
                    ],
                ),
                question(
                    "Sollten Kinder mehr bei Entscheidungen in der Stadt mitreden dürfen?",
                    vec![
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme zu", "SPD"),
                        ("Stimme nicht zu", "CDU"),
                    ],
                ),
                question(
                    "Sollte es mehr Fahrradwege geben?",
                    vec![
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme zu", "SPD"),
                        ("Stimme nicht zu", "AfD"),
                    ],
                ),
                question(
                    "Sollte das Mittagessen in der Schule gesund und kostenlos sein?",
                    vec![
                        ("Stimme zu", "SPD"),
                        ("Stimme zu", "DIE LINKE"),
                        ("Stimme nicht zu", "FDP"),
                    ],
                ),
                question(
                    "Sollte man schon mit 16 Jahren wählen dürfen?",
                    vec![
                        ("Stimme zu", "SPD"),
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme nicht zu", "CDU"),
                    ],
                ),
                question(
                    "Sollte die Polizei mehr in der Stadt präsent sein?",
                    vec![
                        ("Stimme zu", "CDU"),
                        ("Stimme zu", "AfD"),
                        ("Stimme nicht zu", "DIE LINKE"),
                    ],
                ),
                question(
                    "Sollte es mehr Solaranlagen auf Schuldächern geben?",
                    vec![
                        ("Stimme zu", "GRÜNE"),
                        ("Stimme zu", "SPD"),
                        ("Stimme nicht zu", "AfD"),
                    ],
                ),
            ],
        },
    ]
}

fn poll_seeds() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (
            "Wie zufrieden bist du aktuell mit der Bundesregierung?",
            vec![
                "Sehr zufrieden",
                "Zufrieden",
                "Eher unzufrieden",
                "Sehr unzufrieden",
            ],
        ),
        (
            "Sollte ein Verbotsverfahren gegen die AfD eingeleitet werden?",
            vec!["Ja", "Nein", "Unentschlossen"],
        ),
        (
            "Wie stehst Du zur Wiedereinführung der Wehrpflicht?",
            vec!["Dafür", "Dagegen", "Nur als freiwilliges Jahr"],
        ),
        (
            "Sollte Deutschland die Ukraine weiterhin militärisch unterstützen?",
            vec!["Ja, uneingeschränkt", "Ja, aber weniger", "Nein, gar nicht"],
        ),
        (
            "Wie wichtig ist dir Klimaschutz im Alltag?",
            vec![
                "Sehr wichtig",
                "Wichtig",
                "Weniger wichtig",
                "Gar nicht wichtig",
            ],
        ),
        (
            "Sollte das Gendern in öffentlichen Behörden verboten werden?",
            vec!["Ja", "Nein", "Egal"],
        ),
        (
            "Wie wahrscheinlich ist es, dass du an der nächsten Wahl teilnimmst?",
            vec![
                "Sehr wahrscheinlich",
                "Wahrscheinlich",
                "Eher unwahrscheinlich",
                "Sicher nicht",
            ],
        ),
    ]
}

struct ArticleSeed {
    title: &'static str,
    summary: &'static str,
    content: &'static str,
    source: &'static str,
    source_url: &'static str,
}

fn article_seeds() -> Vec<ArticleSeed> {
    vec![
        ArticleSeed {
            title: "Vorstoß der SPD: TikTok und Instagram erst ab 14 Jahren",
            summary: "Die SPD fordert strengere Altersgrenzen für soziale Medien, um Kinder \
                      und Jugendliche besser vor schädlichen Inhalten zu schützen.",
            content: "Ein neuer Vorstoß der SPD-Bundestagsfraktion sorgt für Diskussionen: Die \
                      Partei fordert, dass Plattformen wie TikTok und Instagram erst ab einem \
                      Alter von 14 Jahren genutzt werden dürfen. Ziel ist es, die psychische \
                      Gesundheit junger Menschen zu schützen und Cybermobbing sowie die \
                      Verbreitung von Fake News einzudämmen.",
            source: "MSN / SPD",
            source_url: "https://www.msn.com/de-de/nachrichten/other/vorstoss-der-spd",
        },
        ArticleSeed {
            title: "US-Außenminister besucht Ungarn",
            summary: "Erster Besuch seit sieben Jahren: Gespräche über die transatlantische \
                      Zusammenarbeit in Budapest.",
            content: "Der US-Außenminister besucht erstmals seit sieben Jahren wieder Ungarn. \
                      In Budapest stehen Gespräche über die NATO-Zusammenarbeit, die \
                      Unterstützung der Ukraine und die Rechtsstaatlichkeit in Ungarn auf der \
                      Agenda. Der Besuch gilt als wichtiges Signal für die Beziehungen zwischen \
                      den USA und der ungarischen Regierung.",
            source: "MSN / AFP",
            source_url: "https://www.msn.com/de-de/nachrichten/other/ungarn-besuch",
        },
        ArticleSeed {
            title: "Baden-Württemberg: Was eine neue Regierung in Stuttgart erwartet",
            summary: "Herausforderungen für die nächste Landesregierung: Wirtschaft, Bildung \
                      und Infrastruktur stehen im Fokus.",
            content: "Vor der kommenden Landtagswahl in Baden-Württemberg rücken die großen \
                      Herausforderungen für Stuttgart in den Mittelpunkt. Eine neue Regierung \
                      wird sich mit der Transformation der Automobilindustrie, dem \
                      Lehrermangel und dem maroden Zustand vieler Landesstraßen \
                      auseinandersetzen müssen. Experten betonen die Notwendigkeit schneller \
                      Investitionen und Reformen.",
            source: "MSN / Finanzen",
            source_url: "https://www.msn.com/de-de/finanzen/top-stories/baden-wuerttemberg",
        },
    ]
}

/// Clears the editorial content and reinserts the dataset. User generated
/// rows (quiz results, conversations, messages) are left alone.
pub async fn seed_database(sql: &SqlDb) -> anyhow::Result<()> {
    info!("seeding database with german content");
    let mut tx = sql.begin().await?;

    for table in [
        "quiz_options",
        "quiz_questions",
        "quizzes",
        "poll_votes",
        "poll_options",
        "polls",
        "articles",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }

    for quiz in quiz_seeds() {
        let quiz_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO quizzes (title, description, category, image_url) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(quiz.title)
        .bind(quiz.description)
        .bind(quiz.category)
        .bind(quiz.image_url)
        .fetch_one(&mut *tx)
        .await?;

        for question in quiz.questions {
            let question_id = sqlx::query_scalar::<_, i64>(
                "INSERT INTO quiz_questions (quiz_id, text) VALUES (?, ?) RETURNING id",
            )
            .bind(quiz_id)
            .bind(question.text)
            .fetch_one(&mut *tx)
            .await?;

            for (text, party) in question.options {
                sqlx::query(
                    "INSERT INTO quiz_options (question_id, text, party_affiliation, points) \
                     VALUES (?, ?, ?, ?)",
                )
                .bind(question_id)
                .bind(text)
                .bind(party)
                .bind(label_points(text))
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    for (poll_question, options) in poll_seeds() {
        let poll_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO polls (question, description) VALUES (?, NULL) RETURNING id",
        )
        .bind(poll_question)
        .fetch_one(&mut *tx)
        .await?;

        for option in options {
            sqlx::query("INSERT INTO poll_options (poll_id, text) VALUES (?, ?)")
                .bind(poll_id)
                .bind(option)
                .execute(&mut *tx)
                .await?;
        }
    }

    for article in article_seeds() {
        sqlx::query(
            "INSERT INTO articles (title, summary, content, type, source, source_url) \
             VALUES (?, ?, ?, 'news', ?, ?)",
        )
        .bind(article.title)
        .bind(article.summary)
        .bind(article.content)
        .bind(article.source)
        .bind(article.source_url)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!("seeding complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::db::init_test_db;
    use crate::quiz::list_quizzes;

    use super::seed_database;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let sql = init_test_db().await;
        seed_database(&sql).await.expect("first seed should work");
        seed_database(&sql).await.expect("reseed should work");
        let quizzes = list_quizzes(&sql).await.expect("query should work");
        assert_eq!(quizzes.len(), 3);
    }
}
