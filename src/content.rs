//! Read-only content pools: the prompt catalog and the fragments used to
//! synthesize filler bribes when a player misses a deadline.

use rand::prelude::*;

use crate::error::{GameError, GameResult};
use crate::types::BribeContent;

/// Closed catalog of prompt strings.
pub struct PromptLibrary {
    prompts: Vec<String>,
}

impl PromptLibrary {
    pub fn new(prompts: impl IntoIterator<Item = impl Into<String>>) -> GameResult<Self> {
        let prompts = dedup_pool(prompts);
        if prompts.is_empty() {
            return Err(GameError::rule("Prompt library cannot be empty."));
        }
        Ok(Self { prompts })
    }

    /// The built-in catalog shipped with the server.
    pub fn default_library() -> Self {
        Self::new([
            "Convince them to give you their dessert",
            "Offer to babysit their dragon",
            "Promise to do their chores for a year",
            "Trade your best secret",
            "Sing them a lullaby",
            "Write their campaign speech",
        ])
        .expect("built-in prompt pool is non-empty")
    }

    pub fn random_prompt(&self) -> String {
        let mut rng = rand::rng();
        self.prompts[rng.random_range(0..self.prompts.len())].clone()
    }

    pub fn contains(&self, prompt: &str) -> bool {
        self.prompts.iter().any(|p| p == prompt)
    }

    pub fn all(&self) -> &[String] {
        &self.prompts
    }
}

/// Subject x activity pools used to synthesize random bribes.
pub struct BribeLibrary {
    subjects: Vec<String>,
    activities: Vec<String>,
}

impl BribeLibrary {
    pub fn new(
        subjects: impl IntoIterator<Item = impl Into<String>>,
        activities: impl IntoIterator<Item = impl Into<String>>,
    ) -> GameResult<Self> {
        let subjects = dedup_pool(subjects);
        let activities = dedup_pool(activities);
        if subjects.is_empty() || activities.is_empty() {
            return Err(GameError::rule("Random bribe pools cannot be empty."));
        }
        Ok(Self {
            subjects,
            activities,
        })
    }

    pub fn default_library() -> Self {
        Self::new(
            [
                "a dancing penguin",
                "a golden llama",
                "a teleporting cactus",
                "a whispering taco",
            ],
            [
                "juggling fireworks",
                "painting invisible murals",
                "hosting a midnight tea party",
                "composing interpretive dance",
            ],
        )
        .expect("built-in bribe pools are non-empty")
    }

    pub fn random_bribe(&self) -> BribeContent {
        let mut rng = rand::rng();
        let subject = &self.subjects[rng.random_range(0..self.subjects.len())];
        let activity = &self.activities[rng.random_range(0..self.activities.len())];
        BribeContent::from_text(format!("{subject} while {activity}"))
            .expect("synthesized bribe text is non-empty")
    }
}

/// Trim, drop blanks, and deduplicate a content pool, keeping first-seen order.
fn dedup_pool(items: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    let mut seen = Vec::new();
    for item in items {
        let item = item.into().trim().to_string();
        if !item.is_empty() && !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_library_rejects_empty_pool() {
        assert!(PromptLibrary::new(Vec::<String>::new()).is_err());
        assert!(PromptLibrary::new(["  ", ""]).is_err());
    }

    #[test]
    fn prompt_library_deduplicates_and_trims() {
        let library = PromptLibrary::new(["  a  ", "a", "b"]).unwrap();
        assert_eq!(library.all(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn prompt_library_contains_is_verbatim() {
        let library = PromptLibrary::new(["Sing them a lullaby"]).unwrap();
        assert!(library.contains("Sing them a lullaby"));
        assert!(!library.contains("sing them a lullaby"));
    }

    #[test]
    fn random_prompt_comes_from_pool() {
        let library = PromptLibrary::default_library();
        for _ in 0..20 {
            assert!(library.contains(&library.random_prompt()));
        }
    }

    #[test]
    fn bribe_library_requires_both_pools() {
        assert!(BribeLibrary::new(["subject"], Vec::<String>::new()).is_err());
        assert!(BribeLibrary::new(Vec::<String>::new(), ["activity"]).is_err());
    }

    #[test]
    fn random_bribe_combines_subject_and_activity() {
        let library = BribeLibrary::new(["a singing platypus"], ["moonwalking"]).unwrap();
        let bribe = library.random_bribe();
        assert_eq!(bribe.content, "a singing platypus while moonwalking");
    }
}
