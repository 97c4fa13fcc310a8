use tracing::info;
use uuid::Uuid;

use shared::models::challenge::{Challenge, Difficulty, TestCase};
use shared::repositories::challenge_repository::InMemoryChallengeRepository;

fn case(input: &str, expected_output: &str, is_hidden: bool) -> TestCase {
    TestCase {
        input: input.to_string(),
        expected_output: expected_output.to_string(),
        is_hidden,
    }
}

fn challenge(
    title: &str,
    prompt: &str,
    difficulty: Difficulty,
    time_limit_secs: u64,
    test_cases: Vec<TestCase>,
) -> Challenge {
    Challenge {
        challenge_id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        prompt: prompt.to_string(),
        difficulty,
        test_cases,
        time_limit_secs,
    }
}

/// Populates the in-process challenge pool at startup.
pub fn seed_challenges(repository: &InMemoryChallengeRepository) {
    let batch = vec![
        challenge(
            "Two Sum",
            "Given an array of integers nums and an integer target, return indices of \
             the two numbers such that they add up to target.\n\nYou may assume that \
             each input would have exactly one solution, and you may not use the same \
             element twice.\n\nYou can return the answer in any order.",
            Difficulty::Easy,
            900,
            vec![
                case("[2,7,11,15]\n9", "[0,1]", false),
                case("[3,2,4]\n6", "[1,2]", false),
                case("[3,3]\n6", "[0,1]", false),
                case("[1,5,3,7,8,9]\n12", "[2,4]", true),
            ],
        ),
        challenge(
            "Reverse String",
            "Write a function that reverses a string. The input string is given as an \
             array of characters s.\n\nYou must do this by modifying the input array \
             in-place with O(1) extra memory.",
            Difficulty::Easy,
            900,
            vec![
                case("[\"h\",\"e\",\"l\",\"l\",\"o\"]", "[\"o\",\"l\",\"l\",\"e\",\"h\"]", false),
                case(
                    "[\"H\",\"a\",\"n\",\"n\",\"a\",\"h\"]",
                    "[\"h\",\"a\",\"n\",\"n\",\"a\",\"H\"]",
                    false,
                ),
                case("[\"A\"]", "[\"A\"]", true),
            ],
        ),
        challenge(
            "Valid Parentheses",
            "Given a string s containing just the characters '(', ')', '{', '}', '[' \
             and ']', determine if the input string is valid.\n\nAn input string is \
             valid if:\n1. Open brackets must be closed by the same type of brackets.\n\
             2. Open brackets must be closed in the correct order.\n3. Every close \
             bracket has a corresponding open bracket of the same type.",
            Difficulty::Medium,
            1200,
            vec![
                case("\"()\"", "true", false),
                case("\"()[]{}\"", "true", false),
                case("\"(]\"", "false", false),
                case("\"([)]\"", "false", true),
                case("\"{[]}\"", "true", true),
            ],
        ),
        challenge(
            "Merge Two Sorted Lists",
            "You are given the heads of two sorted linked lists list1 and list2.\n\n\
             Merge the two lists into one sorted list. The list should be made by \
             splicing together the nodes of the first two lists.\n\nReturn the head of \
             the merged linked list.",
            Difficulty::Medium,
            1200,
            vec![
                case("[1,2,4]\n[1,3,4]", "[1,1,2,3,4,4]", false),
                case("[]\n[]", "[]", false),
                case("[]\n[0]", "[0]", false),
                case("[1,3,5]\n[2,4,6]", "[1,2,3,4,5,6]", true),
            ],
        ),
        challenge(
            "Binary Tree Maximum Depth",
            "Given the root of a binary tree, return its maximum depth.\n\nA binary \
             tree's maximum depth is the number of nodes along the longest path from \
             the root node down to the farthest leaf node.",
            Difficulty::Hard,
            1800,
            vec![
                case("[3,9,20,null,null,15,7]", "3", false),
                case("[1,null,2]", "2", false),
                case("[]", "0", true),
            ],
        ),
    ];

    let count = batch.len();
    repository.seed(batch);
    info!("Seeded {} challenges", count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::repositories::challenge_repository::ChallengeRepository;

    #[tokio::test]
    async fn every_difficulty_has_at_least_one_challenge() {
        let repository = InMemoryChallengeRepository::new();
        seed_challenges(&repository);

        for difficulty in Difficulty::ALL {
            let challenge = repository.get_random_challenge(difficulty).await.unwrap();
            assert_eq!(challenge.difficulty, difficulty);
            assert!(!challenge.test_cases.is_empty());
        }
    }

    #[tokio::test]
    async fn seeded_challenges_keep_hidden_cases_out_of_the_public_view() {
        let repository = InMemoryChallengeRepository::new();
        seed_challenges(&repository);

        let challenge = repository
            .get_random_challenge(Difficulty::Easy)
            .await
            .unwrap();
        let view = challenge.public_view();
        assert!(view.visible_test_cases.iter().all(|case| !case.is_hidden));
        assert!(view.visible_test_cases.len() < challenge.test_cases.len());
    }
}
