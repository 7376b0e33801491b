// [libs/domain/models/src/time.rs]
/*!
 * =================================================================
 * APARATO: TEMPORAL CANON (V2.1 - MICROSECOND PARITY)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FORMATO CANÓNICO DE MARCAS TEMPORALES UTC
 *
 * # Mathematical Proof (Lexicographic Ordering):
 * Todas las marcas persistidas usan RFC 3339 UTC con fracción fija de
 * microsegundos y offset '+00:00'. Con longitud y formato constantes,
 * la comparación lexicográfica de SQLite sobre TEXT coincide con el
 * orden cronológico real, habilitando filtros de rango por índice.
 * =================================================================
 */

use chrono::{DateTime, SecondsFormat, Utc};

/// Serializa una marca al canon persistente (RFC 3339, microsegundos, +00:00).
pub fn to_canonical(stamp: DateTime<Utc>) -> String {
    stamp.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Marca actual del reloj de pared en formato canónico.
pub fn now_canonical() -> String {
    to_canonical(Utc::now())
}

/// Parsea una marca RFC 3339 arbitraria (entrada de cámara) hacia UTC.
pub fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Re-emite una marca de entrada en el canon persistente.
pub fn canonicalize(raw: &str) -> Option<String> {
    parse_rfc3339(raw).map(to_canonical)
}

/// Canoniza el fin inclusivo de un rango: una marca sin fracción se expande
/// al último microsegundo de su segundo, cumpliendo la inclusividad a
/// granularidad de segundo; una fracción explícita se respeta exacta.
pub fn canonicalize_range_end(raw: &str) -> Option<String> {
    let parsed = parse_rfc3339(raw)?;
    if parsed.timestamp_subsec_nanos() == 0 {
        Some(to_canonical(parsed + chrono::Duration::microseconds(999_999)))
    } else {
        Some(to_canonical(parsed))
    }
}
