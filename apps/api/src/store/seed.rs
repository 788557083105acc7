//! Default catalog content written into a fresh store.

use crate::models::recommendation::Recommendation;
use crate::models::test::{AnswerOption, Question, Test};

fn question(id: u32, prompt: &str, options: [(&str, &str); 4], correct: &str) -> Question {
    Question {
        id,
        prompt: prompt.to_string(),
        options: options
            .iter()
            .map(|(id, text)| AnswerOption {
                id: id.to_string(),
                text: text.to_string(),
            })
            .collect(),
        correct_answer: correct.to_string(),
    }
}

pub(crate) fn recommendation(
    id: &str,
    title: &str,
    description: &str,
    category: &str,
    difficulty: &str,
    duration: &str,
    url: &str,
    platform: &str,
) -> Recommendation {
    Recommendation {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        difficulty: difficulty.to_string(),
        duration: duration.to_string(),
        url: url.to_string(),
        platform: platform.to_string(),
    }
}

pub fn default_tests() -> Vec<Test> {
    vec![
        Test {
            id: "1".to_string(),
            title: "Frontend Basics".to_string(),
            description: "HTML, CSS and JavaScript fundamentals".to_string(),
            duration: "30 minutes".to_string(),
            category: "Frontend".to_string(),
            difficulty: "Beginner".to_string(),
            questions: vec![
                question(
                    1,
                    "What is the correct way to declare a variable in modern JavaScript?",
                    [
                        ("a", "var name = 'value';"),
                        ("b", "let name = 'value';"),
                        ("c", "const name = 'value';"),
                        ("d", "Both b and c are correct."),
                    ],
                    "d",
                ),
                question(
                    2,
                    "Which CSS property changes the background color of an element?",
                    [
                        ("a", "color"),
                        ("b", "background-color"),
                        ("c", "bgcolor"),
                        ("d", "background"),
                    ],
                    "b",
                ),
                question(
                    3,
                    "Which HTML tag creates a hyperlink?",
                    [
                        ("a", "<a>"),
                        ("b", "<link>"),
                        ("c", "<href>"),
                        ("d", "<hyperlink>"),
                    ],
                    "a",
                ),
                question(
                    4,
                    "Which array method appends elements to the end?",
                    [
                        ("a", "push()"),
                        ("b", "append()"),
                        ("c", "add()"),
                        ("d", "insert()"),
                    ],
                    "a",
                ),
                question(
                    5,
                    "Which CSS selector matches elements with a given class?",
                    [
                        ("a", "#name"),
                        ("b", ".name"),
                        ("c", "*name"),
                        ("d", "name"),
                    ],
                    "b",
                ),
            ],
        },
        Test {
            id: "2".to_string(),
            title: "Algorithms and Data Structures".to_string(),
            description: "Sorting, searching and data structures".to_string(),
            duration: "45 minutes".to_string(),
            category: "Algorithms".to_string(),
            difficulty: "Intermediate".to_string(),
            questions: vec![
                question(
                    1,
                    "What is the average-case time complexity of QuickSort?",
                    [
                        ("a", "O(n)"),
                        ("b", "O(n log n)"),
                        ("c", "O(n²)"),
                        ("d", "O(log n)"),
                    ],
                    "b",
                ),
                question(
                    2,
                    "Which data structure follows the LIFO (Last In, First Out) principle?",
                    [
                        ("a", "Queue"),
                        ("b", "Stack"),
                        ("c", "Linked List"),
                        ("d", "Tree"),
                    ],
                    "b",
                ),
                question(
                    3,
                    "Which sorting algorithm is most efficient on nearly sorted arrays?",
                    [
                        ("a", "Bubble Sort"),
                        ("b", "Merge Sort"),
                        ("c", "Insertion Sort"),
                        ("d", "Selection Sort"),
                    ],
                    "c",
                ),
                question(
                    4,
                    "Which data structure best implements a dictionary?",
                    [
                        ("a", "Array"),
                        ("b", "Linked List"),
                        ("c", "Hash Table"),
                        ("d", "Stack"),
                    ],
                    "c",
                ),
                question(
                    5,
                    "What is the time complexity of binary search?",
                    [
                        ("a", "O(n)"),
                        ("b", "O(n log n)"),
                        ("c", "O(n²)"),
                        ("d", "O(log n)"),
                    ],
                    "d",
                ),
            ],
        },
    ]
}

pub fn default_catalog() -> Vec<Recommendation> {
    vec![
        recommendation(
            "1",
            "Course: React from scratch",
            "Learn the fundamentals of React and improve your Frontend skills",
            "Frontend",
            "Intermediate",
            "10 hours",
            "https://www.freecodecamp.org/learn/front-end-development-libraries/#react",
            "freeCodeCamp",
        ),
        recommendation(
            "2",
            "Project: REST API with Node.js",
            "Build a complete API with authentication and a database",
            "Backend",
            "Intermediate",
            "15 hours",
            "https://www.udemy.com/course/nodejs-the-complete-guide/",
            "Udemy",
        ),
        recommendation(
            "3",
            "Course: Sorting algorithms",
            "Understand and apply the main sorting algorithms",
            "Algorithms",
            "Intermediate",
            "8 hours",
            "https://www.coursera.org/learn/algorithms-part1",
            "Coursera",
        ),
        recommendation(
            "4",
            "Exercise: SQL query optimization",
            "Improve the performance of complex queries in relational databases",
            "Databases",
            "Advanced",
            "5 hours",
            "https://www.codecademy.com/learn/learn-sql",
            "Codecademy",
        ),
        recommendation(
            "5",
            "Course: Docker fundamentals",
            "Learn to containerize applications and manage images",
            "DevOps",
            "Beginner",
            "12 hours",
            "https://www.docker.com/101-tutorial/",
            "Official documentation",
        ),
        recommendation(
            "11",
            "Introduction to Cybersecurity",
            "Learn the fundamentals of information security and data protection",
            "Security",
            "Beginner",
            "15 hours",
            "https://www.netacad.com/courses/introduction-to-cybersecurity",
            "Netacad",
        ),
        recommendation(
            "12",
            "Course: Mobile app development with Flutter",
            "Build native iOS and Android apps from a single codebase",
            "Mobile",
            "Intermediate",
            "25 hours",
            "https://flutter.dev/learn",
            "Official documentation",
        ),
        recommendation(
            "13",
            "AWS Cloud Fundamentals",
            "Learn to use the core Amazon Web Services",
            "Cloud",
            "Beginner",
            "20 hours",
            "https://aws.amazon.com/training/learn-about/",
            "AWS Training",
        ),
        recommendation(
            "14",
            "Course: Machine Learning with Python",
            "Introduction to machine learning algorithms",
            "AI",
            "Intermediate",
            "30 hours",
            "https://www.coursera.org/learn/machine-learning-with-python",
            "Coursera",
        ),
        recommendation(
            "15",
            "User Interface Design",
            "Learn the fundamental principles of UI/UX design",
            "Design",
            "Beginner",
            "12 hours",
            "https://www.interaction-design.org/courses",
            "Interaction Design",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_correct_answer_is_an_offered_option() {
        for test in default_tests() {
            for q in &test.questions {
                assert!(
                    q.options.iter().any(|o| o.id == q.correct_answer),
                    "test {} question {} has no option '{}'",
                    test.id,
                    q.id,
                    q.correct_answer
                );
            }
        }
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let catalog = default_catalog();
        let ids: HashSet<_> = catalog.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
    }
}
