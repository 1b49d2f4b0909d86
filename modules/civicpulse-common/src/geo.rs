//! Codec between (longitude, latitude) pairs and the PostGIS point
//! representation used by the issues table.
//!
//! Points are written as EWKT (`SRID=4326;POINT(lon lat)`) and bound through
//! `ST_GeomFromEWKT`; reads select `ST_AsEWKT(location)`, which yields the
//! same form. The codec must round-trip exactly.

use crate::error::CivicError;
use crate::types::GeoPoint;

const EWKT_PREFIX: &str = "SRID=4326;";

fn check_bounds(longitude: f64, latitude: f64) -> Result<(), CivicError> {
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err(CivicError::InvalidGeometry(format!(
            "coordinates must be finite numbers, got ({longitude}, {latitude})"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(CivicError::InvalidGeometry(format!(
            "longitude {longitude} outside [-180, 180]"
        )));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(CivicError::InvalidGeometry(format!(
            "latitude {latitude} outside [-90, 90]"
        )));
    }
    Ok(())
}

/// Encode a (longitude, latitude) pair as an EWKT point expression.
pub fn encode_point(longitude: f64, latitude: f64) -> Result<String, CivicError> {
    check_bounds(longitude, latitude)?;
    Ok(format!("{EWKT_PREFIX}POINT({longitude} {latitude})"))
}

/// Decode a stored point. Accepts both the EWKT form this codec writes and
/// the bare `POINT(lon lat)` WKT form.
pub fn decode_point(raw: &str) -> Result<(f64, f64), CivicError> {
    let s = raw.trim();
    let s = s.strip_prefix(EWKT_PREFIX).unwrap_or(s);

    let inner = s
        .strip_prefix("POINT(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| CivicError::InvalidGeometry(format!("not a point: {raw}")))?;

    let mut parts = inner.split_whitespace();
    let longitude = parse_coord(parts.next(), raw)?;
    let latitude = parse_coord(parts.next(), raw)?;
    if parts.next().is_some() {
        return Err(CivicError::InvalidGeometry(format!(
            "expected two coordinates: {raw}"
        )));
    }

    check_bounds(longitude, latitude)?;
    Ok((longitude, latitude))
}

/// Decode into a [`GeoPoint`].
pub fn decode_geo_point(raw: &str) -> Result<GeoPoint, CivicError> {
    let (longitude, latitude) = decode_point(raw)?;
    Ok(GeoPoint {
        longitude,
        latitude,
    })
}

fn parse_coord(part: Option<&str>, raw: &str) -> Result<f64, CivicError> {
    part.and_then(|p| p.parse::<f64>().ok())
        .ok_or_else(|| CivicError::InvalidGeometry(format!("non-numeric coordinate in {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(lon: f64, lat: f64) {
        let encoded = encode_point(lon, lat).unwrap();
        let (lon2, lat2) = decode_point(&encoded).unwrap();
        assert_eq!((lon, lat), (lon2, lat2));
    }

    #[test]
    fn roundtrip_representative_coordinates() {
        roundtrip(0.0, 0.0);
        roundtrip(180.0, 90.0);
        roundtrip(-180.0, -90.0);
        roundtrip(-74.0060, 40.7128);
        roundtrip(-93.2650, 44.9778);
    }

    #[test]
    fn encode_produces_ewkt() {
        let encoded = encode_point(-74.006, 40.7128).unwrap();
        assert_eq!(encoded, "SRID=4326;POINT(-74.006 40.7128)");
    }

    #[test]
    fn decode_accepts_bare_wkt() {
        let (lon, lat) = decode_point("POINT(-74.006 40.7128)").unwrap();
        assert_eq!((lon, lat), (-74.006, 40.7128));
    }

    #[test]
    fn rejects_non_finite() {
        assert!(matches!(
            encode_point(f64::NAN, 0.0),
            Err(CivicError::InvalidGeometry(_))
        ));
        assert!(matches!(
            encode_point(0.0, f64::INFINITY),
            Err(CivicError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn rejects_out_of_bounds() {
        assert!(encode_point(180.1, 0.0).is_err());
        assert!(encode_point(0.0, -90.5).is_err());
        assert!(decode_point("POINT(200 10)").is_err());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(decode_point("LINESTRING(0 0, 1 1)").is_err());
        assert!(decode_point("POINT(abc def)").is_err());
        assert!(decode_point("POINT(1 2 3)").is_err());
        assert!(decode_point("").is_err());
    }
}
