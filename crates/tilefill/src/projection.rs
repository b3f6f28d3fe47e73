//! Geographic <-> planar projection.
//!
//! The fill itself only ever sees planar coordinates in meters. Boundaries
//! arrive as longitude/latitude pairs and are projected with a Gauss-Krüger
//! (transverse Mercator) projection on the CGCS2000 ellipsoid; the pieces
//! are projected back and rounded to 6 decimal places before output.
//!
//! Supported reference systems are the "CGCS2000 / Gauss-Kruger CM nE"
//! family, EPSG:4502 (CM 75°E) through EPSG:4512 (CM 135°E), six degrees
//! apart, false easting 500 km, no zone prefix.

use thiserror::Error;

use crate::geometry::Point;

/// A `[longitude, latitude]` pair in degrees.
pub type LonLat = [f64; 2];

/// Default reference system, CM 111°E.
pub const DEFAULT_EPSG: u32 = 4508;

const FIRST_EPSG: u32 = 4502;
const LAST_EPSG: u32 = 4512;
const FIRST_CENTRAL_MERIDIAN: f64 = 75.0;
const ZONE_WIDTH: f64 = 6.0;

/// CGCS2000 ellipsoid semi-major axis (meters).
const CGCS2000_A: f64 = 6_378_137.0;
/// CGCS2000 ellipsoid inverse flattening.
const CGCS2000_INV_F: f64 = 298.257_222_101;

const FALSE_EASTING: f64 = 500_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("Unsupported coordinate reference system EPSG:{0} (supported: 4502-4512)")]
    UnsupportedCrs(u32),

    #[error("Coordinate out of range: lon {lon}, lat {lat}")]
    OutOfRange { lon: f64, lat: f64 },
}

/// Converts between geographic and planar coordinates.
pub trait Projection {
    fn to_plane(&self, lonlat: LonLat) -> Result<Point, ProjectionError>;

    fn to_geographic(&self, point: Point) -> Result<LonLat, ProjectionError>;

    /// Project a sequence of geographic coordinates.
    fn project_all(&self, coords: &[LonLat]) -> Result<Vec<Point>, ProjectionError> {
        coords.iter().map(|c| self.to_plane(*c)).collect()
    }

    /// Project planar points back, rounding to 6 decimal places.
    fn unproject_all(&self, points: &[Point]) -> Result<Vec<LonLat>, ProjectionError> {
        points
            .iter()
            .map(|p| self.to_geographic(*p).map(|[lon, lat]| [round6(lon), round6(lat)]))
            .collect()
    }
}

#[inline]
pub fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

/// Transverse Mercator on an ellipsoid (Snyder's series).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussKruger {
    epsg: Option<u32>,
    central_meridian: f64,
    scale: f64,
    false_easting: f64,
    a: f64,
    e2: f64,
}

impl GaussKruger {
    /// CGCS2000 Gauss-Krüger for a central meridian in degrees.
    pub fn cgcs2000(central_meridian: f64) -> Self {
        let f = 1.0 / CGCS2000_INV_F;
        Self {
            epsg: None,
            central_meridian,
            scale: 1.0,
            false_easting: FALSE_EASTING,
            a: CGCS2000_A,
            e2: f * (2.0 - f),
        }
    }

    /// Look up one of the EPSG:4502..=4512 systems.
    pub fn from_epsg(code: u32) -> Result<Self, ProjectionError> {
        if !(FIRST_EPSG..=LAST_EPSG).contains(&code) {
            return Err(ProjectionError::UnsupportedCrs(code));
        }
        let cm = FIRST_CENTRAL_MERIDIAN + ZONE_WIDTH * (code - FIRST_EPSG) as f64;
        Ok(Self { epsg: Some(code), ..Self::cgcs2000(cm) })
    }

    #[inline]
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    #[inline]
    pub fn central_meridian(&self) -> f64 {
        self.central_meridian
    }

    #[inline]
    fn ep2(&self) -> f64 {
        self.e2 / (1.0 - self.e2)
    }

    /// Meridian arc length from the equator to latitude `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }
}

impl Projection for GaussKruger {
    fn to_plane(&self, [lon, lat]: LonLat) -> Result<Point, ProjectionError> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(ProjectionError::OutOfRange { lon, lat });
        }

        let phi = lat.to_radians();
        let dlambda = (lon - self.central_meridian).to_radians();
        let ep2 = self.ep2();

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();
        let n = self.a / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = dlambda * cos_phi;
        let m = self.meridian_arc(phi);

        let x = self.scale
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);
        let y = self.scale
            * (m + n
                * tan_phi
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

        Ok(Point::new(x + self.false_easting, y))
    }

    fn to_geographic(&self, point: Point) -> Result<LonLat, ProjectionError> {
        if !point.is_finite() {
            return Err(ProjectionError::OutOfRange { lon: point.x, lat: point.y });
        }

        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = self.ep2();
        let x = point.x - self.false_easting;

        // Footpoint latitude.
        let m = point.y / self.scale;
        let mu = m / (self.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let tan1 = phi1.tan();
        let c1 = ep2 * cos1 * cos1;
        let t1 = tan1 * tan1;
        let w = 1.0 - e2 * sin1 * sin1;
        let n1 = self.a / w.sqrt();
        let r1 = self.a * (1.0 - e2) / w.powf(1.5);
        let d = x / (n1 * self.scale);

        let phi = phi1
            - (n1 * tan1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let dlambda = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
                / 120.0)
            / cos1;

        let lat = phi.to_degrees();
        let lon = self.central_meridian + dlambda.to_degrees();
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 {
            return Err(ProjectionError::OutOfRange { lon, lat });
        }
        Ok([lon, lat])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_codes_map_to_central_meridians() {
        assert_eq!(GaussKruger::from_epsg(4502).unwrap().central_meridian(), 75.0);
        assert_eq!(GaussKruger::from_epsg(4508).unwrap().central_meridian(), 111.0);
        assert_eq!(GaussKruger::from_epsg(4512).unwrap().central_meridian(), 135.0);
        assert_eq!(GaussKruger::from_epsg(4326), Err(ProjectionError::UnsupportedCrs(4326)));
    }

    #[test]
    fn equator_on_central_meridian_is_false_origin() {
        let proj = GaussKruger::from_epsg(DEFAULT_EPSG).unwrap();
        let p = proj.to_plane([111.0, 0.0]).unwrap();
        assert!((p.x - 500_000.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn central_meridian_northing_is_meridian_arc() {
        // Meridian arc from the equator to 30°N on GRS80-class ellipsoids.
        let proj = GaussKruger::from_epsg(DEFAULT_EPSG).unwrap();
        let p = proj.to_plane([111.0, 30.0]).unwrap();
        assert!((p.x - 500_000.0).abs() < 1e-6);
        assert!((p.y - 3_320_113.4).abs() < 0.5, "northing {}", p.y);
    }

    #[test]
    fn easting_grows_east_of_central_meridian() {
        let proj = GaussKruger::from_epsg(DEFAULT_EPSG).unwrap();
        let west = proj.to_plane([110.0, 30.0]).unwrap();
        let east = proj.to_plane([112.0, 30.0]).unwrap();
        assert!(west.x < 500_000.0 && east.x > 500_000.0);
        // Symmetric about the central meridian.
        assert!((500_000.0 - west.x - (east.x - 500_000.0)).abs() < 1e-6);
        assert!((west.y - east.y).abs() < 1e-6);
        // One degree of longitude at 30°N is roughly 96.5 km.
        assert!((east.x - 500_000.0 - 96_490.0).abs() < 200.0);
    }

    #[test]
    fn round_trip_near_central_meridian() {
        let proj = GaussKruger::from_epsg(DEFAULT_EPSG).unwrap();
        for lonlat in [[111.3, 30.2], [110.1, 22.5], [112.7, 41.9]] {
            let back = proj.to_geographic(proj.to_plane(lonlat).unwrap()).unwrap();
            assert!((back[0] - lonlat[0]).abs() < 1e-7, "{back:?} vs {lonlat:?}");
            assert!((back[1] - lonlat[1]).abs() < 1e-7, "{back:?} vs {lonlat:?}");
        }
    }

    #[test]
    fn round_trip_far_from_central_meridian() {
        // Hangzhou is ~9° east of CM 111°E.
        let proj = GaussKruger::from_epsg(DEFAULT_EPSG).unwrap();
        let lonlat = [120.13, 30.27];
        let back = proj.to_geographic(proj.to_plane(lonlat).unwrap()).unwrap();
        assert!((back[0] - lonlat[0]).abs() < 1e-5);
        assert!((back[1] - lonlat[1]).abs() < 1e-5);
    }

    #[test]
    fn unproject_rounds_to_six_decimals() {
        let proj = GaussKruger::from_epsg(DEFAULT_EPSG).unwrap();
        let planar = proj.project_all(&[[111.123_456_789, 30.987_654_321]]).unwrap();
        let back = proj.unproject_all(&planar).unwrap();
        assert_eq!(back, vec![[111.123457, 30.987654]]);
    }

    #[test]
    fn rejects_out_of_range_input() {
        let proj = GaussKruger::cgcs2000(111.0);
        assert!(proj.to_plane([111.0, 91.0]).is_err());
        assert!(proj.to_plane([f64::NAN, 30.0]).is_err());
        assert!(proj.to_geographic(Point::new(f64::INFINITY, 0.0)).is_err());
    }
}
