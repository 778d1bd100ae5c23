//! Prompts for summary, quiz, flashcard and resource generation.
//!
//! Every prompt lives here so wording changes touch exactly one place and
//! tests can inspect prompts without a model. Prompts are in French, the
//! language the generated learning material is expected in; the document
//! text is always the last block of the prompt.

/// Prepended by the generation client when a JSON reply is expected.
pub const JSON_ONLY_INSTRUCTION: &str = "Tu dois répondre UNIQUEMENT avec un objet JSON valide.
Réponds UNIQUEMENT avec le JSON, sans texte supplémentaire.";

/// Prompt for a ≤300-word French summary of `text`.
pub fn summary_prompt(text: &str) -> String {
    format!(
        "Tu es un expert en synthèse de documents.
Fais un résumé clair, structuré et concis du texte suivant.
Le résumé doit être en français et ne pas dépasser 300 mots.

Texte à résumer:
{text}
"
    )
}

/// Prompt for a five-question multiple-choice quiz about `text`.
pub fn quiz_prompt(text: &str) -> String {
    format!(
        r#"Tu es un générateur expert de quiz pédagogiques.

Basé sur le texte suivant, génère un quiz de 5 questions à choix multiples.

INSTRUCTIONS:
1. Génère exactement 5 questions.
2. Chaque question doit avoir exactement 4 options.
3. Formate les options ainsi : "a) ...", "b) ...", "c) ...", "d) ...".
4. Indique clairement la bonne réponse : "answer": "a) ...".
5. Ajoute une explication pour chaque bonne réponse.
6. Utilise uniquement les informations contenues dans le texte.
7. Retourne la réponse en JSON valide.

Format attendu:
[
  {{
    "question": "Texte",
    "options": ["a) ...", "b) ...", "c) ...", "d) ..."],
    "answer": "a) ...",
    "explanation": "..."
  }}
]

Texte:
{text}
"#
    )
}

/// Prompt for ten recto/verso flashcards about `text`.
pub fn flashcards_prompt(text: &str) -> String {
    format!(
        r#"Tu es un expert pédagogique spécialisé dans la création de flashcards.

Basé sur le texte suivant, génère exactement **10 flashcards éducatives**.

INSTRUCTIONS STRICTES :
1. Génère exactement 10 flashcards.
2. Chaque flashcard doit contenir :
   - "recto": une question ou un concept
   - "verso": la réponse ou l'explication
3. Les flashcards doivent couvrir les concepts les plus importants du texte.
4. Sois clair, concis et pédagogique.
5. Retourne uniquement du JSON valide.

FORMAT EXACT :
[
  {{
    "recto": "Question ou concept",
    "verso": "Réponse ou explication"
  }}
]

Texte :
{text}
"#
    )
}

/// Prompt for five to eight further-reading resources about `text`.
pub fn resources_prompt(text: &str) -> String {
    format!(
        r#"Tu es un expert en pédagogie et recommandation de ressources d'apprentissage.

Basé sur le texte suivant, génère **5 à 8 ressources éducatives** pour approfondir le sujet.

INSTRUCTIONS STRICTES :
1. Génère entre 5 et 8 ressources.
2. Pour chaque ressource, fournis :
   - "type": (livre, article, vidéo, cours en ligne, MOOC, documentaire, etc.)
   - "title": titre de la ressource
   - "description": bref résumé (1 à 3 phrases)
   - "why_useful": pourquoi cette ressource est pertinente pour comprendre le sujet
3. Propose des ressources **réelles si possible**, sinon cohérentes.
4. Retourne uniquement un JSON valide.

FORMAT ATTENDU :
[
  {{
    "type": "livre",
    "title": "Titre du livre",
    "description": "Courte description",
    "why_useful": "Raison de pertinence"
  }}
]

Texte :
{text}
"#
    )
}
