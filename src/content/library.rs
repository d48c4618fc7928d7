//! Built-in lesson tables.
//!
//! Every subject carries a full lesson bundle. Topic entries are optional and
//! only override the pieces they name; everything else falls back to the
//! subject bundle, and unknown subjects fall back to [`DEFAULT_SUBJECT`].

use super::subject::{Subject, DEFAULT_SUBJECT};

pub const QUESTIONS_PER_SUBJECT: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct QuestionEntry {
    pub prompt: &'static str,
    pub options: [&'static str; 4],
    pub correct_index: usize,
    pub explanation: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ConceptEntry {
    pub definition: &'static str,
    pub rules: &'static [&'static str],
    pub worked_example: &'static str,
    pub common_mistakes: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct LessonEntry {
    pub subject: Subject,
    pub intro: &'static str,
    pub explanation: &'static str,
    pub example: &'static str,
    pub questions: [QuestionEntry; QUESTIONS_PER_SUBJECT],
    pub revision_points: &'static [&'static str],
    pub concept: ConceptEntry,
}

#[derive(Debug, Clone, Copy)]
pub struct TopicEntry {
    pub subject: Subject,
    pub topic: &'static str,
    pub revision_points: Option<&'static [&'static str]>,
    pub concept: Option<ConceptEntry>,
}

pub static LESSONS: [LessonEntry; 5] = [
    LessonEntry {
        subject: Subject::Mathematics,
        intro: "Today we will build confidence with algebra. We start from what you already know about numbers and move step by step towards solving equations.",
        explanation: "An equation is a balance. Whatever you do to one side, you must do to the other. To solve for x, undo each operation in reverse order until x stands alone.",
        example: "Solve 3x + 5 = 20. Subtract 5 from both sides to get 3x = 15, then divide both sides by 3 to get x = 5. Check: 3 times 5 plus 5 is 20.",
        questions: [
            QuestionEntry {
                prompt: "Solve 2x + 4 = 10. What is x?",
                options: ["2", "3", "4", "7"],
                correct_index: 1,
                explanation: "Subtract 4 from both sides to get 2x = 6, then divide by 2 to get x = 3.",
            },
            QuestionEntry {
                prompt: "What is the value of 5² − 3²?",
                options: ["4", "16", "34", "2"],
                correct_index: 1,
                explanation: "5² is 25 and 3² is 9, so the difference is 16.",
            },
            QuestionEntry {
                prompt: "Which expression equals 3(x + 4)?",
                options: ["3x + 4", "x + 12", "3x + 12", "3x + 7"],
                correct_index: 2,
                explanation: "Multiply every term inside the bracket by 3: 3 times x plus 3 times 4 gives 3x + 12.",
            },
        ],
        revision_points: &[
            "An equation stays balanced when you apply the same operation to both sides.",
            "Undo operations in reverse order: addition and subtraction before multiplication and division.",
            "Expanding a bracket multiplies every term inside it.",
            "Always substitute your answer back in to check it.",
        ],
        concept: ConceptEntry {
            definition: "Algebra uses letters to stand for unknown numbers so that relationships can be written and solved.",
            rules: &[
                "Apply the same operation to both sides of an equation.",
                "Collect like terms before solving.",
                "Expand brackets by multiplying each term inside.",
            ],
            worked_example: "4x − 7 = 9 → 4x = 16 → x = 4.",
            common_mistakes: &[
                "Changing only one side of the equation.",
                "Forgetting to multiply the second term when expanding a bracket.",
            ],
        },
    },
    LessonEntry {
        subject: Subject::Physics,
        intro: "Today we explore forces and motion: why things start moving, why they stop, and how we can predict what they will do next.",
        explanation: "A force is a push or a pull measured in newtons. When the forces on an object are balanced it keeps doing what it was doing. When they are unbalanced it accelerates, and F = m × a tells us by how much.",
        example: "A 2 kg trolley is pushed with a resultant force of 10 N. Using a = F ÷ m, the acceleration is 10 ÷ 2 = 5 m/s².",
        questions: [
            QuestionEntry {
                prompt: "What is the unit of force?",
                options: ["Joule", "Newton", "Watt", "Pascal"],
                correct_index: 1,
                explanation: "Force is measured in newtons (N), named after Isaac Newton.",
            },
            QuestionEntry {
                prompt: "A 4 kg mass accelerates at 3 m/s². What is the resultant force?",
                options: ["7 N", "1.3 N", "12 N", "0.75 N"],
                correct_index: 2,
                explanation: "F = m × a, so 4 × 3 = 12 N.",
            },
            QuestionEntry {
                prompt: "If the forces on a moving object are balanced, the object will...",
                options: [
                    "slow down and stop",
                    "keep moving at a constant velocity",
                    "speed up",
                    "change direction",
                ],
                correct_index: 1,
                explanation: "Balanced forces mean no resultant force, so the velocity does not change.",
            },
        ],
        revision_points: &[
            "Force is measured in newtons (N).",
            "Balanced forces give no change in motion.",
            "Resultant force = mass × acceleration (F = m × a).",
            "Weight = mass × gravitational field strength.",
        ],
        concept: ConceptEntry {
            definition: "A force is an interaction that can change the motion or shape of an object.",
            rules: &[
                "F = m × a",
                "W = m × g",
                "Balanced forces give zero acceleration.",
            ],
            worked_example: "m = 5 kg, a = 2 m/s² → F = 10 N.",
            common_mistakes: &[
                "Confusing mass (kg) with weight (N).",
                "Using the applied force instead of the resultant force.",
            ],
        },
    },
    LessonEntry {
        subject: Subject::Chemistry,
        intro: "Today we look inside matter itself: atoms, the particles they are made of, and how they join together to form everything around us.",
        explanation: "Atoms contain protons and neutrons in a central nucleus, with electrons arranged in shells around it. The number of protons is the atomic number and decides which element the atom is.",
        example: "Sodium has atomic number 11, so it has 11 protons and, as a neutral atom, 11 electrons arranged 2, 8, 1 across its shells.",
        questions: [
            QuestionEntry {
                prompt: "Which particle has a negative charge?",
                options: ["Proton", "Neutron", "Electron", "Nucleus"],
                correct_index: 2,
                explanation: "Electrons carry a negative charge; protons are positive and neutrons are neutral.",
            },
            QuestionEntry {
                prompt: "What does the atomic number of an element tell you?",
                options: [
                    "The number of neutrons",
                    "The number of protons",
                    "The mass of the atom",
                    "The number of shells",
                ],
                correct_index: 1,
                explanation: "The atomic number is the number of protons in the nucleus.",
            },
            QuestionEntry {
                prompt: "What is the chemical formula for water?",
                options: ["H2O", "CO2", "O2", "H2O2"],
                correct_index: 0,
                explanation: "Water is two hydrogen atoms bonded to one oxygen atom: H2O.",
            },
        ],
        revision_points: &[
            "Atoms contain protons, neutrons and electrons.",
            "The atomic number equals the number of protons.",
            "Electrons are arranged in shells: 2, then 8, then 8.",
            "Elements in the same group have the same number of outer electrons.",
        ],
        concept: ConceptEntry {
            definition: "An atom is the smallest particle of an element that keeps the properties of that element.",
            rules: &[
                "Atomic number = number of protons.",
                "Mass number = protons + neutrons.",
                "In a neutral atom, electrons = protons.",
            ],
            worked_example: "Carbon-12: 6 protons, 6 neutrons, 6 electrons arranged 2, 4.",
            common_mistakes: &[
                "Adding electrons into the mass number.",
                "Mixing up atomic number and mass number.",
            ],
        },
    },
    LessonEntry {
        subject: Subject::Biology,
        intro: "Today we study cells, the building blocks of every living thing, and the structures that keep them alive.",
        explanation: "Every cell has a membrane, cytoplasm and genetic material. Animal cells keep their DNA in a nucleus; plant cells also have a cell wall, a permanent vacuole and chloroplasts for photosynthesis.",
        example: "A leaf palisade cell is packed with chloroplasts because it sits near the top of the leaf, where it can absorb the most light.",
        questions: [
            QuestionEntry {
                prompt: "Which structure controls what enters and leaves a cell?",
                options: ["Cell wall", "Cell membrane", "Nucleus", "Vacuole"],
                correct_index: 1,
                explanation: "The cell membrane is partially permeable and controls movement in and out.",
            },
            QuestionEntry {
                prompt: "Where does photosynthesis take place?",
                options: ["Mitochondria", "Ribosomes", "Chloroplasts", "Nucleus"],
                correct_index: 2,
                explanation: "Chloroplasts contain chlorophyll, which absorbs light for photosynthesis.",
            },
            QuestionEntry {
                prompt: "Which of these is found in plant cells but not animal cells?",
                options: ["Cell wall", "Cytoplasm", "Cell membrane", "Nucleus"],
                correct_index: 0,
                explanation: "Plant cells have a cellulose cell wall; animal cells do not.",
            },
        ],
        revision_points: &[
            "All cells have a membrane, cytoplasm and genetic material.",
            "Plant cells add a cell wall, a permanent vacuole and chloroplasts.",
            "Mitochondria release energy through respiration.",
            "Ribosomes make proteins.",
        ],
        concept: ConceptEntry {
            definition: "A cell is the smallest unit of life that can carry out all life processes.",
            rules: &[
                "Structure matches function.",
                "Specialised cells have adaptations for their job.",
            ],
            worked_example: "Root hair cells have a long extension to increase surface area for absorbing water.",
            common_mistakes: &[
                "Saying plant cells have no mitochondria.",
                "Confusing the cell wall with the cell membrane.",
            ],
        },
    },
    LessonEntry {
        subject: Subject::English,
        intro: "Today we sharpen our writing by looking at how sentences are built and how punctuation guides the reader.",
        explanation: "A sentence needs a subject and a verb and must express a complete thought. Punctuation marks the boundaries: full stops end sentences, commas separate clauses and items, and apostrophes show possession or missing letters.",
        example: "\"The dog barked\" is a complete sentence. \"Because the dog barked\" is not: it leaves the reader waiting for what happened next.",
        questions: [
            QuestionEntry {
                prompt: "Which of these is a complete sentence?",
                options: [
                    "Running to the shop.",
                    "When she arrived.",
                    "The cat slept.",
                    "Although it rained.",
                ],
                correct_index: 2,
                explanation: "\"The cat slept.\" has a subject and a verb and expresses a complete thought.",
            },
            QuestionEntry {
                prompt: "Which word is a verb in \"The children laughed loudly\"?",
                options: ["The", "children", "laughed", "loudly"],
                correct_index: 2,
                explanation: "\"Laughed\" is the action, so it is the verb.",
            },
            QuestionEntry {
                prompt: "Choose the correct use of the apostrophe.",
                options: ["The dogs' bone", "The dog's bone", "The dogs bone's", "The dog bone's"],
                correct_index: 1,
                explanation: "For one dog owning a bone, the apostrophe goes before the s: the dog's bone.",
            },
        ],
        revision_points: &[
            "A sentence needs a subject, a verb and a complete thought.",
            "Full stops end sentences; commas separate clauses and list items.",
            "Apostrophes show possession or missing letters.",
            "Vary sentence length to keep the reader interested.",
        ],
        concept: ConceptEntry {
            definition: "Grammar is the set of rules that governs how words combine into meaningful sentences.",
            rules: &[
                "Every sentence needs a main verb.",
                "Capital letters start sentences and proper nouns.",
            ],
            worked_example: "\"its\" shows possession; \"it's\" means \"it is\".",
            common_mistakes: &[
                "Joining two sentences with only a comma.",
                "Using an apostrophe to make a plural.",
            ],
        },
    },
];

pub static TOPICS: [TopicEntry; 3] = [
    TopicEntry {
        subject: Subject::Mathematics,
        topic: "Quadratic Equations",
        revision_points: Some(&[
            "A quadratic has the form ax² + bx + c = 0.",
            "Factorise by finding two numbers that multiply to c and add to b.",
            "The quadratic formula works for every quadratic.",
            "A quadratic has at most two real solutions.",
        ]),
        concept: Some(ConceptEntry {
            definition: "A quadratic equation is a polynomial equation whose highest power of the unknown is 2.",
            rules: &[
                "x = (−b ± √(b² − 4ac)) ÷ 2a",
                "If b² − 4ac < 0 there are no real solutions.",
            ],
            worked_example: "x² − 5x + 6 = 0 → (x − 2)(x − 3) = 0 → x = 2 or x = 3.",
            common_mistakes: &[
                "Dropping the ± and finding only one solution.",
                "Sign errors when factorising.",
            ],
        }),
    },
    TopicEntry {
        subject: Subject::Physics,
        topic: "Newton's Laws",
        revision_points: Some(&[
            "First law: an object stays at rest or in uniform motion unless a resultant force acts.",
            "Second law: F = m × a.",
            "Third law: every action has an equal and opposite reaction.",
        ]),
        concept: None,
    },
    TopicEntry {
        subject: Subject::Biology,
        topic: "Photosynthesis",
        revision_points: None,
        concept: Some(ConceptEntry {
            definition: "Photosynthesis is the process plants use to make glucose from carbon dioxide and water using light energy.",
            rules: &["carbon dioxide + water → glucose + oxygen", "It takes place in chloroplasts."],
            worked_example: "Raising light intensity speeds up photosynthesis until another factor becomes limiting.",
            common_mistakes: &[
                "Saying plants do not respire.",
                "Forgetting that oxygen is a product.",
            ],
        }),
    },
];

pub fn lesson(subject: Subject) -> &'static LessonEntry {
    LESSONS
        .iter()
        .find(|entry| entry.subject == subject)
        .or_else(|| LESSONS.iter().find(|entry| entry.subject == DEFAULT_SUBJECT))
        .unwrap_or(&LESSONS[0])
}

pub fn topic(subject: Subject, topic: &str) -> Option<&'static TopicEntry> {
    let wanted = topic.trim();
    TOPICS
        .iter()
        .find(|entry| entry.subject == subject && entry.topic.eq_ignore_ascii_case(wanted))
}
