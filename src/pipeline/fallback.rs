//! Canned learning content returned when generation and both decoders fail.
//!
//! Every structured operation substitutes these lists on total failure so
//! callers always receive a non-empty, well-typed payload.

use crate::output::{EducationalResource, Flashcard, QuizItem};

/// Two questions about the PDF format.
pub fn fallback_quiz() -> Vec<QuizItem> {
    vec![
        QuizItem {
            question: "Que signifie l'acronyme PDF ?".into(),
            options: vec![
                "a) Portable Document Format".into(),
                "b) Personal Data File".into(),
                "c) Printable Document Form".into(),
                "d) Public Document File".into(),
            ],
            answer: "a) Portable Document Format".into(),
            explanation:
                "PDF signifie Portable Document Format, un format de fichier développé par Adobe."
                    .into(),
        },
        QuizItem {
            question: "Quelle est la principale caractéristique d'un fichier PDF ?".into(),
            options: vec![
                "a) Il est toujours modifiable".into(),
                "b) Il préserve la mise en forme sur tous les appareils".into(),
                "c) Il est toujours plus petit qu'un fichier Word".into(),
                "d) Il ne peut contenir que du texte".into(),
            ],
            answer: "b) Il préserve la mise en forme sur tous les appareils".into(),
            explanation: "Le format PDF préserve la mise en forme originale du document quel que soit l'appareil ou le logiciel utilisé.".into(),
        },
    ]
}

/// Three flashcards about the PDF format.
pub fn fallback_flashcards() -> Vec<Flashcard> {
    vec![
        Flashcard {
            recto: "Que signifie PDF ?".into(),
            verso: "Portable Document Format - Format de document portable créé par Adobe.".into(),
        },
        Flashcard {
            recto: "Quel est l'avantage principal du format PDF ?".into(),
            verso: "Il conserve la mise en forme originale du document sur n'importe quel appareil."
                .into(),
        },
        Flashcard {
            recto: "Quel logiciel a créé le format PDF ?".into(),
            verso: "Adobe Systems a développé le format PDF dans les années 1990.".into(),
        },
    ]
}

/// Two reading resources about the PDF format.
pub fn fallback_resources() -> Vec<EducationalResource> {
    vec![
        EducationalResource {
            kind: "Documentation".into(),
            title: "Guide officiel du format PDF".into(),
            description: "Documentation complète sur le format PDF par Adobe".into(),
            why_useful: "Comprendre les spécifications techniques du format PDF".into(),
        },
        EducationalResource {
            kind: "Tutoriel".into(),
            title: "Créer et manipuler des PDF avec Python".into(),
            description: "Tutoriel sur l'utilisation de bibliothèques Python pour les PDF".into(),
            why_useful: "Apprendre à automatiser le traitement des PDF".into(),
        },
    ]
}
