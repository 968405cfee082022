use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Quote board for every caucion term traded today.
#[derive(Debug, Deserialize)]
pub struct QuoteBoard {
    pub titulos: Vec<BoardRow>,
}

#[derive(Debug, Deserialize)]
pub struct BoardRow {
    /// Term code, e.g. "T0" or "T3".
    pub plazo: String,
    /// Annualized rate for the term, in percent.
    #[serde(rename = "variacionPorcentual")]
    pub rate: f64,
}
