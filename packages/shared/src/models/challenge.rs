use serde::{Deserialize, Serialize};

/// Difficulty bucket a challenge (and its matchmaking queue) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    /// Hidden cases are run on submit but never shown to players.
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub challenge_id: String,
    pub title: String,
    pub prompt: String,
    pub difficulty: Difficulty,
    pub test_cases: Vec<TestCase>,
    /// Advisory display timer; the core never force-completes on it.
    pub time_limit_secs: u64,
}

impl Challenge {
    pub fn visible_test_cases(&self) -> Vec<TestCase> {
        self.test_cases
            .iter()
            .filter(|case| !case.is_hidden)
            .cloned()
            .collect()
    }

    /// Projection safe to send to players: hidden test cases stripped.
    pub fn public_view(&self) -> ChallengeView {
        ChallengeView {
            challenge_id: self.challenge_id.clone(),
            title: self.title.clone(),
            prompt: self.prompt.clone(),
            difficulty: self.difficulty,
            visible_test_cases: self.visible_test_cases(),
            time_limit_secs: self.time_limit_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeView {
    pub challenge_id: String,
    pub title: String,
    pub prompt: String,
    pub difficulty: Difficulty,
    pub visible_test_cases: Vec<TestCase>,
    pub time_limit_secs: u64,
}
