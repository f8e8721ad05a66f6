//! Deterministic synthetic payload generation.
//!
//! Identifying fields (name, email, tax id, phone) are derived from
//! `(run id, index)`: two payloads in the same run never collide, and
//! two separate runs are extremely unlikely to. Generation is pure, so
//! restarting an iterator reproduces the same sequence.

use fixtura_api::ResourceKind;
use serde_json::json;

use crate::nif;
use crate::run::RunId;

/// Marker embedded in every generated name or reference so cleanup can
/// find synthetic records later.
pub const RUN_MARKER: &str = "Fixtura Test";

/// A generated, immutable record payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    /// Identifying label (name or reference), used in logs and errors.
    pub label: String,
    /// JSON body submitted to the creation endpoint.
    pub body: serde_json::Value,
}

/// Lazily yield exactly `count` payloads for `kind`.
pub fn payloads(
    kind: ResourceKind,
    count: usize,
    run_id: RunId,
) -> impl Iterator<Item = Payload> {
    (0..count).map(move |index| build(kind, run_id, index))
}

/// Build the payload at `index` of a run.
#[must_use]
pub fn build(kind: ResourceKind, run_id: RunId, index: usize) -> Payload {
    match kind {
        ResourceKind::Contacts => contact(run_id, index),
        ResourceKind::Catalog => catalog_item(run_id, index),
        ResourceKind::Invoices => invoice(run_id, index),
    }
}

fn contact(run_id: RunId, index: usize) -> Payload {
    let seq = index + 1;
    let tax_number = run_id.as_u64().wrapping_add(index as u64);
    let tax_id = nif::company_nif(run_id.as_u64() ^ index as u64, tax_number);
    let label = format!("{RUN_MARKER} Contact {run_id}-{seq}");
    let body = json!({
        "name": label,
        "email": format!("fixtura.{run_id}.{seq}@test.invalid"),
        "nif": tax_id,
        "isCustomer": true,
        "isSupplier": false,
        "contactType": "COMPANY",
        "preferences": [],
        "phone": format!("+34 600 {seq:03} {:03}", run_id.short()),
        "address": format!("Calle Test {run_id}, {seq}"),
        "city": "Madrid",
        "zipCode": "28001",
        "country": "ESP",
        "state": "Madrid",
    });
    Payload { label, body }
}

fn catalog_item(run_id: RunId, index: usize) -> Payload {
    let seq = index + 1;
    let label = format!("{RUN_MARKER} Product {run_id}-{seq}");
    let body = json!({
        "name": label,
        "description": format!("Synthetic catalog item {seq} for run {run_id}"),
        // Unique price per item keeps listings distinguishable by eye.
        "price": 99.99 + index as f64,
        "type": "PRODUCT",
        "tags": ["test", "fixtura", format!("run-{run_id}"), format!("item-{seq}")],
    });
    Payload { label, body }
}

fn invoice(run_id: RunId, index: usize) -> Payload {
    let seq = index + 1;
    let label = format!("FIX-{run_id}-{seq:04}");
    let body = json!({
        "reference": label,
        "description": format!("{RUN_MARKER} invoice {seq} for run {run_id}"),
        "amount": 100.0 + seq as f64,
        "tags": ["test", "fixtura", format!("run-{run_id}")],
    });
    Payload { label, body }
}
