// ── Wire-to-domain product conversions ──
//
// Bridges `catalog_api::ProductDto` and `crate::model::Product`. Mapping is
// total: missing text becomes an empty string and a missing or unparseable
// date becomes the current instant. Dates are kept at millisecond precision
// so that a domain -> wire -> domain trip is lossless.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};

use catalog_api::ProductDto;

use crate::form::ProductForm;
use crate::model::Product;

/// Date-only format used by edit forms.
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a wire date: RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read
/// as UTC), or a bare `YYYY-MM-DD` (UTC midnight).
pub(crate) fn parse_wire_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).trunc_subsecs(3));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().trunc_subsecs(3));
    }
    parse_form_date(raw).map(midnight_utc)
}

/// Parse a form date (`YYYY-MM-DD`).
pub(crate) fn parse_form_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), FORM_DATE_FORMAT).ok()
}

/// The literal calendar date at 00:00 UTC; never shifted by a local zone.
pub(crate) fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Canonical wire form: `2025-01-01T00:00:00.000Z`.
pub fn format_wire_date(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Form representation of an instant (its UTC calendar date).
pub fn format_form_date(dt: &DateTime<Utc>) -> String {
    dt.format(FORM_DATE_FORMAT).to_string()
}

fn date_or(raw: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(parse_wire_date).unwrap_or(fallback)
}

// ── Product ────────────────────────────────────────────────────────

/// Map a wire record using `now` for missing dates.
pub(crate) fn product_from_dto(dto: ProductDto, now: DateTime<Utc>) -> Product {
    let now = now.trunc_subsecs(3);
    Product {
        date_release: date_or(dto.date_release.as_deref(), now),
        date_revision: date_or(dto.date_revision.as_deref(), now),
        id: dto.id.unwrap_or_default(),
        name: dto.name.unwrap_or_default(),
        description: dto.description.unwrap_or_default(),
        logo: dto.logo.unwrap_or_default(),
    }
}

/// Wire record to domain. Never fails; see the module notes for defaults.
pub fn to_domain(dto: ProductDto) -> Product {
    product_from_dto(dto, Utc::now())
}

/// Domain record to wire, with canonical timestamps.
pub fn to_dto(p: &Product) -> ProductDto {
    ProductDto {
        id: Some(p.id.clone()),
        name: Some(p.name.clone()),
        description: Some(p.description.clone()),
        logo: Some(p.logo.clone()),
        date_release: Some(format_wire_date(&p.date_release)),
        date_revision: Some(format_wire_date(&p.date_revision)),
    }
}

impl From<ProductDto> for Product {
    fn from(dto: ProductDto) -> Self {
        to_domain(dto)
    }
}

impl From<&Product> for ProductDto {
    fn from(p: &Product) -> Self {
        to_dto(p)
    }
}

// ── Edit form ──────────────────────────────────────────────────────

/// Upconvert form dates to the canonical wire form. An unparseable date is
/// passed through untouched and degrades to "now" when mapped to the domain.
fn form_date_to_wire(raw: &str) -> String {
    parse_form_date(raw).map_or_else(|| raw.to_owned(), |d| format_wire_date(&midnight_utc(d)))
}

/// Edit-form values to wire. Date-only strings keep their calendar day.
pub fn from_edit_form(form: &ProductForm) -> ProductDto {
    ProductDto {
        id: Some(form.id.trim().to_owned()),
        name: Some(form.name.clone()),
        description: Some(form.description.clone()),
        logo: Some(form.logo.clone()),
        date_release: Some(form_date_to_wire(&form.date_release)),
        date_revision: Some(form_date_to_wire(&form.date_revision)),
    }
}

impl From<&ProductForm> for ProductDto {
    fn from(form: &ProductForm) -> Self {
        from_edit_form(form)
    }
}
