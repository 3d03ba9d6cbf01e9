// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telephone canonicalization.
//!
//! A raw number plus an ISO-3166 country becomes country code + national
//! number, digits only, no `+`. Anything that is not a mobile number of the
//! stated country (landlines, foreign numbers, junk) normalizes to `""`,
//! which callers treat as "not eligible" rather than as an error.
//!
//! Numbering plans come from the libphonenumber metadata shipped with the
//! `phonenumber` crate, so every region it knows is supported.

use phonenumber::country::Id;
use phonenumber::metadata::DATABASE;
use phonenumber::{Mode, PhoneNumber, Type};

/// A region known to the numbering-plan metadata.
struct Region {
    id: Id,
    dial_code: String,
}

impl Region {
    /// Resolve an ISO-3166 alpha-2 code, accepting the common `UK` alias.
    fn lookup(country: &str) -> Option<Self> {
        let iso = country.trim().to_ascii_uppercase();
        let iso = if iso == "UK" { "GB".to_string() } else { iso };
        let id = iso.parse().ok()?;
        let meta = DATABASE.by_id(&iso)?;
        Some(Self {
            id,
            dial_code: meta.country_code().to_string(),
        })
    }
}

/// A parsed number counts when it is valid, lives in `region` and is (or may
/// be) a mobile. Shared fixed/mobile plans such as `+1` report the latter.
fn is_mobile_of(number: &PhoneNumber, region: Id) -> bool {
    phonenumber::is_valid(number)
        && number.country().id() == Some(region)
        && matches!(
            number.number_type(&DATABASE),
            Type::Mobile | Type::FixedLineOrMobile
        )
}

fn parse_mobile(tel: &str, region: &Region) -> Option<PhoneNumber> {
    let national = phonenumber::parse(Some(region.id), tel)
        .ok()
        .filter(|n| is_mobile_of(n, region.id));
    if national.is_some() {
        return national;
    }

    // Already carries the dialling code but lost its `+`.
    if !tel.starts_with(&region.dial_code) {
        return None;
    }
    phonenumber::parse(Some(region.id), format!("+{tel}"))
        .ok()
        .filter(|n| is_mobile_of(n, region.id))
}

/// Canonicalize `raw` for `country`.
///
/// Steps: trim, strip one leading `00`, strip one leading `+`, and for `NL`
/// replace a leading `31` with a trunk `0`. What remains is parsed against the
/// country's numbering plan and kept only if it is one of its mobiles.
///
/// A number still carrying a `+` after that cleanup (for example `++1775...`)
/// is taken as already international and its digits are returned without
/// validation.
pub fn normalize(raw: &str, country: &str) -> String {
    let mut tel = raw.trim();
    tel = tel.strip_prefix("00").unwrap_or(tel);
    tel = tel.strip_prefix('+').unwrap_or(tel);
    let tel = if country.trim().eq_ignore_ascii_case("NL") {
        format!("0{}", tel.strip_prefix("31").unwrap_or(tel))
    } else {
        tel.to_string()
    };

    let compact: String = tel.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(international) = compact.strip_prefix('+') {
        return international.chars().filter(char::is_ascii_digit).collect();
    }

    let Some(region) = Region::lookup(country) else {
        return String::new();
    };
    match parse_mobile(&compact, &region) {
        Some(number) => number
            .format()
            .mode(Mode::E164)
            .to_string()
            .trim_start_matches('+')
            .to_string(),
        None => String::new(),
    }
}

/// Dialling code for `country`, e.g. `44` for `GB`.
pub fn country_code(country: &str) -> Option<String> {
    Region::lookup(country).map(|region| region.dial_code)
}

/// Replace the first occurrence of the country's dialling code in `telephone`.
///
/// Used for gateways whose SIMs cannot send to international-format numbers;
/// `replacement` is usually `"0"`. Unknown countries leave the number as is.
pub fn replace_country_code(telephone: &str, country: &str, replacement: &str) -> String {
    match country_code(country) {
        Some(code) => telephone.replacen(&code, replacement, 1),
        None => telephone.to_string(),
    }
}
