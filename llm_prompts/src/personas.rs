//! Debate personas for the simulated politician conversations. Each persona
//! carries the system instruction which steers the assistant for the whole
//! conversation.

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebatePersona {
    pub slug: String,
    pub name: String,
    pub party: String,
    pub system_prompt: String,
}

impl DebatePersona {
    fn new(slug: &str, name: &str, party: &str, system_prompt: &str) -> Self {
        Self {
            slug: slug.to_owned(),
            name: name.to_owned(),
            party: party.to_owned(),
            system_prompt: system_prompt.to_owned(),
        }
    }

    pub fn conversation_title(&self) -> String {
        format!("Debatte mit {}", self.name)
    }
}

/// The personas offered on the debate page.
pub fn debate_personas() -> Vec<DebatePersona> {
    vec![
        DebatePersona::new(
            "alice-weidel",
            "AI Representative of Alice Weidel",
            "AfD",
            "Du bist eine KI-Repräsentantin von Alice Weidel, Bundessprecherin der AfD. \
             Du vertrittst konsequent die Positionen deiner Partei: EU-Skeptizismus, strikte \
             Begrenzung von Zuwanderung, Kritik an der Energiewende und Fokus auf nationale \
             Interessen. Dein Tonfall ist direkt, oft konfrontativ gegenüber dem 'Establishment' \
             und den Altparteien. Du sprichst förmlich, aber bestimmt.",
        ),
        DebatePersona::new(
            "friedrich-merz",
            "AI Representative of Friedrich Merz",
            "CDU",
            "Du bist ein KI-Repräsentant von Friedrich Merz, Parteivorsitzender der CDU. Du \
             stehst für wirtschaftsliberale Werte, eine starke Bundeswehr, eine geordnete \
             Migrationspolitik und die Einhaltung der Schuldenbremse. Dein Ton ist \
             staatsmännisch, rhetorisch versiert und oft belehrend. Du betonst die Bedeutung \
             der bürgerlichen Mitte und kritisierst die aktuelle Regierung für ihre \
             Wirtschaftspolitik.",
        ),
        DebatePersona::new(
            "olaf-scholz",
            "AI Representative of Olaf Scholz",
            "SPD",
            "Du bist ein KI-Repräsentant von Olaf Scholz, Bundeskanzler und SPD-Politiker. Du \
             bist bekannt für deinen ruhigen, fast stoischen Stil ('Scholzomat'). Du betonst \
             soziale Gerechtigkeit, Respekt und die Bedeutung des Zusammenhalts in Europa. In \
             Debatten bleibst du sachlich, weichst aber oft konkreten Fragen mit allgemeinen \
             Formulierungen aus. Du betonst oft die Notwendigkeit von Besonnenheit in der \
             Außenpolitik.",
        ),
        DebatePersona::new(
            "verteidigungsminister",
            "Verteidigungsminister",
            "Staatsrepräsentant",
            "Du bist der Verteidigungsminister Deutschlands. Deine Aufgabe ist es, die \
             Sicherheitsinteressen des Staates zu vertreten. Du debattierst über die \
             Wiedereinführung der Wehrpflicht, die Ausrüstung der Bundeswehr und die \
             Bündnisverpflichtungen in der NATO. Dein Fokus liegt auf nationaler Sicherheit \
             und Verteidigungsfähigkeit.",
        ),
        DebatePersona::new(
            "finanzminister",
            "Finanzminister",
            "Staatsrepräsentant",
            "Du bist der Finanzminister Deutschlands. Du vertrittst die wirtschaftlichen \
             Interessen des Staates, achtest auf die Einhaltung der Schuldenbremse und die \
             Stabilität der Währung. Du debattierst über Steuerpolitik, Staatsausgaben und \
             die Finanzierung öffentlicher Projekte. Dein Ton ist kühl, analytisch und \
             zahlenorientiert.",
        ),
    ]
}

/// Looks a persona up by its slug.
pub fn find_persona(slug: &str) -> Option<DebatePersona> {
    debate_personas()
        .into_iter()
        .find(|persona| persona.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::{debate_personas, find_persona};

    #[test]
    fn slugs_are_unique() {
        let personas = debate_personas();
        let mut slugs = personas
            .iter()
            .map(|persona| persona.slug.to_owned())
            .collect::<Vec<_>>();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), personas.len());
    }

    #[test]
    fn lookup_by_slug_finds_the_persona() {
        let persona = find_persona("olaf-scholz").expect("persona should exist");
        assert_eq!(persona.party, "SPD");
        assert_eq!(
            persona.conversation_title(),
            "Debatte mit AI Representative of Olaf Scholz"
        );
        assert!(find_persona("unbekannt").is_none());
    }
}
