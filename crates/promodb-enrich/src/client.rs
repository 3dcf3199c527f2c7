//! HTTP client for the Gemini-style `generateContent` oracle endpoint.

use std::time::Duration;

use promodb_core::EnrichmentResult;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::OracleError;
use crate::types::{EnrichmentInput, RawEnrichment};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

const SYSTEM_PROMPT: &str = "\
Je bent een data-processor voor een Belgische voedingsapp. Je krijgt een lijst \
producten (naam, korting-tekst, originele prijs).

Geef per product een JSON object terug met:
- clean_name: leesbare productnaam. Behoud verpakkingsinfo die het product uniek \
maakt (bv. \"Bak 24x25cl\", \"1kg\", \"6-pack\"); verwijder alleen rommel zoals \
\"promo\" of \"actie\".
- category: kies uit ['Groenten','Fruit','Vlees_Vis_Vega','Zuivel','Koolhydraten',\
'Pantry','Snacks','Drinken','Huishouden','Overig'].
- primary_macro: kies uit [Protein, Carbs, Fat, Balanced, None].
- is_healthy: boolean.
- promo_price: de effectieve promotieprijs per stuk op basis van de korting en de \
originele prijs, afgerond op 2 decimalen. Null wanneer de originele prijs \
onbekend is of de korting niet rekenbaar. Geef een getal, geen tekst.
- is_meerdere_artikels: boolean, true wanneer meerdere stuks nodig zijn om de \
korting te krijgen.
- deal_quantity: totaal aantal stuks in een volledige deal.

Antwoord ALLEEN met een JSON array. Geen uitleg.";

/// Client for the enrichment oracle.
///
/// Use [`OracleClient::new`] for production or
/// [`OracleClient::with_base_url`] to point at a mock server in tests.
pub struct OracleClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl OracleClient {
    /// Creates a new client pointed at the production oracle endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, OracleError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`OracleError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("promodb/0.1 (promo-aggregation)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|_| OracleError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// Sends one batch of products and parses the oracle's JSON array answer.
    ///
    /// The returned list is whatever the oracle produced — the caller is
    /// responsible for positional alignment with the input.
    ///
    /// # Errors
    ///
    /// - [`OracleError::Http`] on network failure or non-2xx HTTP status.
    /// - [`OracleError::ApiError`] if the envelope carries no text.
    /// - [`OracleError::Deserialize`] if the envelope or the embedded array
    ///   does not match the expected shape.
    pub async fn generate(
        &self,
        items: &[EnrichmentInput],
    ) -> Result<Vec<EnrichmentResult>, OracleError> {
        let items_json =
            serde_json::to_string(items).map_err(|e| OracleError::Deserialize {
                context: "request payload".to_owned(),
                source: e,
            })?;
        let prompt = format!(
            "Verwerk deze {count} producten:\n\n{items_json}\n\nGeef exact {count} JSON objecten terug in een array.",
            count = items.len(),
        );

        let body = serde_json::json!({
            "system_instruction": { "parts": [ { "text": SYSTEM_PROMPT } ] },
            "contents": [ { "parts": [ { "text": prompt } ] } ],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let url = self.build_url()?;
        let response = self.client.post(url.clone()).json(&body).send().await?;
        let response = response.error_for_status()?;
        let raw_body = response.text().await?;

        let envelope: GenerateResponse =
            serde_json::from_str(&raw_body).map_err(|e| OracleError::Deserialize {
                context: "generateContent envelope".to_owned(),
                source: e,
            })?;

        let text = envelope
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|parts| parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| OracleError::ApiError("response contained no text".to_owned()))?;

        let raw: Vec<RawEnrichment> =
            serde_json::from_str(&text).map_err(|e| OracleError::Deserialize {
                context: "oracle result array".to_owned(),
                source: e,
            })?;

        Ok(raw.into_iter().map(RawEnrichment::into_result).collect())
    }

    /// Builds the `generateContent` URL with the API key as a query param.
    fn build_url(&self) -> Result<Url, OracleError> {
        let mut url = self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|_| OracleError::InvalidBaseUrl(self.model.clone()))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}
