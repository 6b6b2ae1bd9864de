// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-backed corpus cleaning.
//!
//! Sends the training corpus through the model in small batches and
//! keeps only the conversations the model returns with messages
//! intact. The model is instructed to drop unreadable messages
//! (placeholder sentinels, bare symbols, empty bodies) and to drop
//! conversations that lose every message.

use std::path::Path;

use tracing::{info, warn};

use kalam_core::corpus::{read_non_empty_corpus, write_corpus};
use kalam_core::{Conversation, KalamError};

use crate::client::GeminiClient;
use crate::generate::retain_usable;
use crate::types::cleaning_schema;

/// The cleaning prompt wraps one serialized batch of conversations.
fn cleaning_prompt(batch_json: &str) -> String {
    format!(
        "Vous êtes un outil de nettoyage de données de conversation. Votre tâche est de lire un \
         ensemble de conversations JSON et de les renvoyer dans un format JSON identique, mais \
         avec les modifications suivantes :\n\n\
         1. **Supprimer les messages non clairs ou non pertinents :** Cela inclut les messages \
         contenant uniquement des caractères spéciaux comme '*', les messages vides, les \
         messages d'erreurs, ou tout ce qui n'est pas une réponse lisible.\n\
         2. **Corriger le format des messages d'erreur :** Si un message a un texte comme \
         \"[Erreur parsing]\", il doit être supprimé.\n\
         3. **Conserver les conversations claires :** La conversation doit conserver sa \
         structure (statut, résumé, messages). Si une conversation ne contient que des messages \
         non pertinents, elle doit être supprimée du résultat final.\n\n\
         Voici le lot de conversations à nettoyer :\n{batch_json}\n\n\
         Veuillez retourner le JSON nettoyé."
    )
}

/// Clean `input` batch by batch and write the surviving conversations
/// to `output`.
///
/// A failed batch stops the run; batches already cleaned are kept. If
/// nothing survives, `output` is left untouched so a previous good
/// artifact is never replaced by an empty one.
pub async fn clean_training_data(
    client: &GeminiClient,
    input: &Path,
    output: &Path,
    batch_size: usize,
) -> Result<usize, KalamError> {
    let corpus = read_non_empty_corpus(input)?;
    info!(
        conversations = corpus.len(),
        batch_size,
        "cleaning training corpus"
    );

    let mut cleaned: Vec<Conversation> = Vec::new();
    for (index, batch) in corpus.chunks(batch_size).enumerate() {
        if index > 0 {
            tokio::time::sleep(client.batch_pause()).await;
        }

        let batch_json =
            serde_json::to_string(batch).map_err(|e| KalamError::ExternalService {
                message: format!("failed to serialize cleaning batch: {e}"),
            })?;
        match client
            .generate_conversations(&cleaning_prompt(&batch_json), cleaning_schema())
            .await
        {
            Ok(returned) => {
                cleaned.extend(retain_usable(returned));
                info!(batch = index + 1, kept = cleaned.len(), "cleaning batch done");
            }
            Err(e) => {
                warn!(batch = index + 1, error = %e, "cleaning batch abandoned, keeping earlier batches");
                break;
            }
        }
    }

    if cleaned.is_empty() {
        warn!("cleaning produced no conversations, output left untouched");
        return Ok(0);
    }

    write_corpus(output, &cleaned)?;
    info!(
        before = corpus.len(),
        after = cleaned.len(),
        output = %output.display(),
        "cleaned corpus written"
    );
    Ok(cleaned.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use kalam_core::corpus::read_corpus;
    use kalam_core::{Message, SenderType};

    fn conversation(status: &str, text: &str) -> Conversation {
        Conversation {
            status: status.into(),
            summary: "résumé".into(),
            messages: vec![Message {
                timestamp: String::new(),
                sender_type: SenderType::Contact,
                text: text.into(),
            }],
            ..Default::default()
        }
    }

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new("k", "test-model", base_url)
            .unwrap()
            .with_retry(1, Duration::from_millis(1))
            .with_batch_pause(Duration::from_millis(1))
    }

    fn envelope(conversations: &[Conversation]) -> serde_json::Value {
        let embedded = serde_json::to_string(conversations).unwrap();
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": embedded}]}}]
        })
    }

    #[tokio::test]
    async fn cleaning_replaces_corpus_with_model_output() {
        let server = MockServer::start().await;
        let returned = vec![
            conversation("Qualified", "clair"),
            Conversation {
                status: "Unqualified".into(),
                ..Default::default()
            },
        ];
        Mock::given(method("POST"))
            .and(body_string_contains("nettoyage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&returned)))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("training_dataset.json");
        let output = dir.path().join("cleaned_training_data.json");
        write_corpus(
            &input,
            &[
                conversation("Qualified", "clair"),
                conversation("Qualified", "[Erreur parsing]"),
            ],
        )
        .unwrap();

        let count = clean_training_data(&test_client(&server.uri()), &input, &output, 5)
            .await
            .unwrap();
        // The empty shell the model returned is filtered out too.
        assert_eq!(count, 1);
        let written = read_corpus(&output).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].messages[0].text, "clair");
    }

    #[tokio::test]
    async fn failed_batch_keeps_earlier_batches() {
        let server = MockServer::start().await;
        let first = vec![conversation("Qualified", "premier lot")];
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&first)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.json");
        let output = dir.path().join("output.json");
        write_corpus(
            &input,
            &[
                conversation("Qualified", "a"),
                conversation("Qualified", "b"),
            ],
        )
        .unwrap();

        let count = clean_training_data(&test_client(&server.uri()), &input, &output, 1)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(read_corpus(&output).unwrap(), first);
    }

    #[tokio::test]
    async fn empty_result_never_overwrites_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.json");
        let output = dir.path().join("output.json");
        write_corpus(&input, &[conversation("Qualified", "a")]).unwrap();
        let previous = vec![conversation("Qualified", "artefact précédent")];
        write_corpus(&output, &previous).unwrap();

        let count = clean_training_data(&test_client(&server.uri()), &input, &output, 5)
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(read_corpus(&output).unwrap(), previous);
    }

    #[tokio::test]
    async fn missing_input_is_source_not_found() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let err = clean_training_data(
            &test_client(&server.uri()),
            &dir.path().join("absent.json"),
            &dir.path().join("out.json"),
            5,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, KalamError::SourceNotFound { .. }));
    }
}
