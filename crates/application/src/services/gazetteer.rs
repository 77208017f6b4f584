//! In-memory city gazetteer
//!
//! Loaded once from a tab-separated dataset and read-only afterwards.
//! Column positions follow the standard dataset layout:
//!
//! | column | content |
//! |---|---|
//! | 0 | id |
//! | 1 | name |
//! | 2 | ASCII name |
//! | 3 | alternate names, comma-separated |
//! | 4 / 5 | latitude / longitude |
//! | 8 | country code |
//! | 10 | admin state |
//! | 15 | population (empty = unknown) |
//! | 16 | elevation |
//! | 17 | timezone |

use std::collections::HashMap;
use std::io::BufRead;

use domain::{City, GeoPoint};
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;

mod column {
    pub const ID: usize = 0;
    pub const NAME: usize = 1;
    pub const ASCII_NAME: usize = 2;
    pub const ALTERNATE_NAMES: usize = 3;
    pub const LATITUDE: usize = 4;
    pub const LONGITUDE: usize = 5;
    pub const COUNTRY_CODE: usize = 8;
    pub const ADMIN_STATE: usize = 10;
    pub const POPULATION: usize = 15;
    pub const ELEVATION: usize = 16;
    pub const TIMEZONE: usize = 17;
}

/// Minimum number of columns a row must have
const MIN_COLUMNS: usize = column::TIMEZONE + 1;

/// Read-only index of cities
///
/// Cities keep the position of their first appearance; a later row with the
/// same id replaces the earlier one in place.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    cities: Vec<City>,
    by_id: HashMap<u64, usize>,
}

impl Gazetteer {
    /// Load a gazetteer from tab-separated rows
    ///
    /// Short or malformed rows (including rows that are not valid UTF-8) are
    /// skipped with a warning. Duplicate ids overwrite earlier rows.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the reader fails.
    #[instrument(skip(reader))]
    pub fn from_reader<R: BufRead>(mut reader: R) -> std::io::Result<Self> {
        let mut gazetteer = Self::default();
        let mut buf = Vec::new();
        let mut line_no = 0_usize;
        let mut skipped = 0_usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let Ok(line) = std::str::from_utf8(&buf) else {
                warn!(line = line_no, "Skipping gazetteer row: invalid UTF-8");
                skipped += 1;
                continue;
            };
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }

            match parse_city_row(line) {
                Some(city) => gazetteer.insert(city),
                None => {
                    warn!(line = line_no, "Skipping malformed gazetteer row");
                    skipped += 1;
                },
            }
        }

        info!(cities = gazetteer.len(), skipped, "Loaded gazetteer");
        Ok(gazetteer)
    }

    /// Build a gazetteer from already-parsed cities, last duplicate wins
    #[must_use]
    pub fn from_cities(cities: impl IntoIterator<Item = City>) -> Self {
        let mut gazetteer = Self::default();
        for city in cities {
            gazetteer.insert(city);
        }
        gazetteer
    }

    fn insert(&mut self, city: City) {
        if let Some(&index) = self.by_id.get(&city.id) {
            debug!(id = city.id, "Duplicate city id replaces earlier row");
            self.cities[index] = city;
        } else {
            self.by_id.insert(city.id, self.cities.len());
            self.cities.push(city);
        }
    }

    /// Look up a city by id
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::CityNotFound`] if no city has this id.
    pub fn find_by_id(&self, id: u64) -> Result<&City, ApplicationError> {
        self.by_id
            .get(&id)
            .and_then(|&index| self.cities.get(index))
            .ok_or(ApplicationError::CityNotFound(id))
    }

    /// Case-insensitive substring search over name, ASCII name and
    /// alternate names, in dataset order
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NoCityMatch`] if nothing matches or the
    /// search text is blank.
    pub fn search(&self, text: &str) -> Result<Vec<&City>, ApplicationError> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ApplicationError::NoCityMatch(text.to_string()));
        }

        let matches: Vec<&City> = self
            .cities
            .iter()
            .filter(|city| city.matches_lowercase(&needle))
            .collect();

        debug!(text = %needle, hits = matches.len(), "Searched gazetteer");
        if matches.is_empty() {
            return Err(ApplicationError::NoCityMatch(text.to_string()));
        }
        Ok(matches)
    }

    /// Number of distinct cities
    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Whether no city was loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// All cities in dataset order
    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }
}

/// Parse one tab-separated dataset row, `None` if it is short or malformed
#[must_use]
pub fn parse_city_row(line: &str) -> Option<City> {
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() < MIN_COLUMNS {
        return None;
    }

    let id: u64 = cols[column::ID].trim().parse().ok().filter(|id| *id > 0)?;
    let latitude: f64 = cols[column::LATITUDE].trim().parse().ok()?;
    let longitude: f64 = cols[column::LONGITUDE].trim().parse().ok()?;
    let geo = GeoPoint::new(latitude, longitude).ok()?;

    let population = match cols[column::POPULATION].trim() {
        "" => None,
        raw => Some(raw.parse::<u64>().ok()?),
    };
    let elevation: i32 = cols[column::ELEVATION].trim().parse().ok()?;

    Some(City {
        id,
        name: cols[column::NAME].to_string(),
        ascii_name: cols[column::ASCII_NAME].to_string(),
        alternate_names: cols[column::ALTERNATE_NAMES]
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        country_code: cols[column::COUNTRY_CODE].to_string(),
        admin_state: cols[column::ADMIN_STATE].to_string(),
        geo,
        elevation,
        population,
        timezone: cols[column::TIMEZONE].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::too_many_arguments)]
    fn row(
        id: &str,
        name: &str,
        ascii: &str,
        alternates: &str,
        lat: &str,
        lon: &str,
        population: &str,
        elevation: &str,
    ) -> String {
        [
            id, name, ascii, alternates, lat, lon, "P", "PPLC", "DK", "", "17", "", "", "", "",
            population, elevation, "Europe/Copenhagen", "2024-01-01",
        ]
        .join("\t")
    }

    fn dataset() -> String {
        [
            row("2618425", "København", "Kobenhavn", "Copenhagen,Kopenhagen,", "55.67594", "12.56553", "1153615", "14"),
            row("2614481", "Roskilde", "Roskilde", "", "55.64152", "12.08035", "", "37"),
            row("2613939", "Skagen", "Skagen", "Skaw", "57.72093", "10.58394", "8515", "7"),
        ]
        .join("\n")
    }

    fn gazetteer() -> Gazetteer {
        Gazetteer::from_reader(dataset().as_bytes()).unwrap()
    }

    #[test]
    fn loads_all_rows() {
        let g = gazetteer();
        assert_eq!(g.len(), 3);
        assert!(!g.is_empty());
        let ids: Vec<u64> = g.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2_618_425, 2_614_481, 2_613_939]);
    }

    #[test]
    fn parses_columns_by_position() {
        let g = gazetteer();
        let city = g.find_by_id(2_618_425).unwrap();
        assert_eq!(city.name, "København");
        assert_eq!(city.ascii_name, "Kobenhavn");
        assert_eq!(city.alternate_names, vec!["Copenhagen", "Kopenhagen"]);
        assert_eq!(city.country_code, "DK");
        assert_eq!(city.admin_state, "17");
        assert!((city.geo.latitude() - 55.67594).abs() < f64::EPSILON);
        assert!((city.geo.longitude() - 12.56553).abs() < f64::EPSILON);
        assert_eq!(city.population, Some(1_153_615));
        assert_eq!(city.elevation, 14);
        assert_eq!(city.timezone, "Europe/Copenhagen");
    }

    #[test]
    fn empty_population_is_unknown() {
        assert_eq!(gazetteer().find_by_id(2_614_481).unwrap().population, None);
    }

    #[test]
    fn missing_id_is_not_found() {
        assert!(matches!(
            gazetteer().find_by_id(1),
            Err(ApplicationError::CityNotFound(1))
        ));
    }

    #[test]
    fn search_is_case_insensitive() {
        let g = gazetteer();
        let hits = g.search("copenhagen").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2_618_425);
        assert_eq!(g.search("COPENHAGEN").unwrap()[0].id, 2_618_425);
        assert_eq!(g.search("københavn").unwrap()[0].id, 2_618_425);
    }

    #[test]
    fn search_matches_substrings_in_dataset_order() {
        let g = gazetteer();
        let hits = g.search("sk").unwrap();
        let ids: Vec<u64> = hits.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2_614_481, 2_613_939]);
    }

    #[test]
    fn search_without_match_is_an_error() {
        assert!(matches!(
            gazetteer().search("zzzznotacity"),
            Err(ApplicationError::NoCityMatch(_))
        ));
        assert!(matches!(
            gazetteer().search("   "),
            Err(ApplicationError::NoCityMatch(_))
        ));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let data = [
            "too\tshort".to_string(),
            row("abc", "Bad Id", "Bad Id", "", "1", "1", "", "0"),
            row("0", "Zero Id", "Zero Id", "", "1", "1", "", "0"),
            row("5", "Bad Lat", "Bad Lat", "", "95", "1", "", "0"),
            row("6", "Bad Pop", "Bad Pop", "", "1", "1", "lots", "0"),
            row("7", "Good", "Good", "", "1", "1", "", "0"),
        ]
        .join("\n");
        let g = Gazetteer::from_reader(data.as_bytes()).unwrap();
        assert_eq!(g.len(), 1);
        assert_eq!(g.find_by_id(7).unwrap().name, "Good");
    }

    #[test]
    fn invalid_utf8_rows_are_skipped() {
        let mut data = row("7", "Good", "Good", "", "1", "1", "", "0").into_bytes();
        data.extend_from_slice(b"\n8\t\xff\xfe\n");
        let g = Gazetteer::from_reader(data.as_slice()).unwrap();
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn duplicate_ids_last_wins_in_first_position() {
        let data = [
            row("1", "First", "First", "", "1", "1", "", "0"),
            row("2", "Other", "Other", "", "1", "1", "", "0"),
            row("1", "Second", "Second", "", "2", "2", "", "0"),
        ]
        .join("\r\n");
        let g = Gazetteer::from_reader(data.as_bytes()).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.find_by_id(1).unwrap().name, "Second");
        let names: Vec<&str> = g.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "Other"]);
    }

    #[test]
    fn from_cities_builds_index() {
        let city = parse_city_row(&row("9", "Nine", "Nine", "", "1", "1", "", "0")).unwrap();
        let g = Gazetteer::from_cities([city.clone(), city]);
        assert_eq!(g.len(), 1);
        assert!(g.find_by_id(9).is_ok());
    }
}
