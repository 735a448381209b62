//! Conversion between envelopes and their four-number array form.
//!
//! Values pass through untouched: degenerate, inverted and empty envelopes
//! survive the round trip.

use geosource_core_common::Envelope;

/// `[minx, miny, maxx, maxy]`.
#[must_use]
pub fn box_to_array(envelope: &Envelope) -> [f64; 4] {
    [envelope.minx, envelope.miny, envelope.maxx, envelope.maxy]
}

#[must_use]
pub fn array_to_box(values: [f64; 4]) -> Envelope {
    let [minx, miny, maxx, maxy] = values;
    Envelope::new(minx, miny, maxx, maxy)
}
