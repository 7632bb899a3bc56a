//! Station catalog: which stations contribute to which category.
//!
//! For each category we walk the window table of its period, keep the
//! channels whose code ends with the category component, count their windows
//! and resolve their coordinates from the station table.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{Category, CategoryCounts, SpherePoint, Station, WeightRecord, WeightSet};
use crate::error::WeightError;
use crate::io::{StationTable, WindowTable};

/// Stations grouped by category. Only categories with measurements are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationCatalog {
    stations: BTreeMap<Category, Vec<Station>>,
}

impl StationCatalog {
    /// Build the catalog for `categories`.
    ///
    /// `windows` maps a period band to its window table. Categories that end
    /// up without any measurement are dropped with a warning.
    pub fn build(
        categories: &[Category],
        stations: &StationTable,
        windows: &BTreeMap<String, WindowTable>,
    ) -> Result<Self, WeightError> {
        let mut out = BTreeMap::new();
        for category in categories {
            let Some(table) = windows.get(&category.period) else {
                warn!(%category, "no window table for period; category skipped");
                continue;
            };
            let list = get_stations(category, table, stations)?;
            if list.is_empty() {
                warn!(%category, "no measurements; category skipped");
                continue;
            }
            debug!(%category, n_stations = list.len(), "catalogued category");
            out.insert(category.clone(), list);
        }
        Ok(Self { stations: out })
    }

    pub fn from_stations(stations: BTreeMap<Category, Vec<Station>>) -> Self {
        Self { stations }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, &Vec<Station>)> {
        self.stations.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn category_count(&self) -> usize {
        self.stations.len()
    }

    pub fn station_count(&self) -> usize {
        self.stations.values().map(Vec::len).sum()
    }

    /// Σ window_count per category.
    pub fn measurement_counts(&self) -> CategoryCounts {
        self.stations
            .iter()
            .map(|(cat, list)| (cat.clone(), list.iter().map(|s| s.window_count).sum()))
            .collect()
    }

    /// Fresh records (receiver = category = 1, no final weight), one per
    /// station and in station order.
    pub fn initial_weights(&self) -> WeightSet {
        let mut set = WeightSet::new();
        for (cat, list) in &self.stations {
            let records = list
                .iter()
                .map(|s| WeightRecord::new(s.key(), s.window_count))
                .collect();
            set.insert(cat.clone(), records);
        }
        set
    }
}

/// Resolve the coordinates of `NET.STA` from the station table.
///
/// A key matches when it equals the receiver or continues it with a `.`
/// segment, so `IU.ANM` does not pick up `IU.ANMO.00.BHZ`.
pub fn find_station_location(receiver: &str, table: &StationTable) -> Option<SpherePoint> {
    let prefix = format!("{receiver}.");
    table
        .range(receiver.to_string()..)
        .take_while(|(key, _)| key.starts_with(receiver))
        .find(|(key, _)| key.as_str() == receiver || key.starts_with(&prefix))
        .map(|(_, entry)| entry.location())
}

/// Stations of one category from one period's window table.
///
/// Channels of the same receiver seen under several events or location codes
/// are merged into one station; their window counts add up.
pub fn get_stations(
    category: &Category,
    windows: &WindowTable,
    table: &StationTable,
) -> Result<Vec<Station>, WeightError> {
    let mut merged: BTreeMap<String, Station> = BTreeMap::new();

    for channels in windows.values() {
        for (channel_id, list) in channels {
            let (network, name, channel) = split_channel_id(channel_id)?;
            if !channel.ends_with(category.component) {
                continue;
            }
            if list.is_empty() {
                debug!(channel = %channel_id, "channel has no windows; skipped");
                continue;
            }

            let receiver = format!("{network}.{name}");
            let location = find_station_location(&receiver, table)
                .ok_or_else(|| WeightError::MissingLocation { receiver: receiver.clone() })?;

            let key = format!("{receiver}.{channel}");
            let count = list.len() as u64;
            merged
                .entry(key)
                .and_modify(|s| s.window_count += count)
                .or_insert_with(|| Station {
                    network: network.to_string(),
                    name: name.to_string(),
                    channel: channel.to_string(),
                    location,
                    window_count: count,
                });
        }
    }

    Ok(merged.into_values().collect())
}

/// `NET.STA.LOC.CHAN` -> `(NET, STA, CHAN)`.
fn split_channel_id(channel_id: &str) -> Result<(&str, &str, &str), WeightError> {
    let parts: Vec<&str> = channel_id.split('.').collect();
    match parts.as_slice() {
        [net, sta, _loc, chan] if !net.is_empty() && !sta.is_empty() && !chan.is_empty() => {
            Ok((*net, *sta, *chan))
        }
        _ => Err(WeightError::MalformedChannel {
            channel: channel_id.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::StationEntry;
    use serde_json::json;

    fn station_table() -> StationTable {
        let mut t = StationTable::new();
        for (key, lat, lon) in [
            ("IU.ANMO.00.BHZ", 34.9, -106.5),
            ("IU.ANMO.00.BHE", 34.9, -106.5),
            ("IU.ANM.00.BHZ", 1.0, 1.0),
            ("II.AAK.00.BHZ", 42.6, 74.5),
        ] {
            t.insert(
                key.to_string(),
                StationEntry {
                    latitude: lat,
                    longitude: lon,
                },
            );
        }
        t
    }

    fn windows(value: serde_json::Value) -> WindowTable {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn prefix_lookup_respects_segments() {
        let t = station_table();
        assert_eq!(
            find_station_location("IU.ANMO", &t),
            Some(SpherePoint::new(34.9, -106.5))
        );
        assert_eq!(find_station_location("IU.ANM", &t), Some(SpherePoint::new(1.0, 1.0)));
        assert_eq!(find_station_location("IU.AN", &t), None);
    }

    #[test]
    fn filters_by_component_and_counts_windows() {
        let w = windows(json!({
            "EV": {
                "IU.ANMO.00.BHZ": [{}, {}, {}],
                "IU.ANMO.00.BHR": [{}],
                "II.AAK.00.BHZ": [{}],
            }
        }));
        let list = get_stations(&Category::new("17_40", 'Z'), &w, &station_table()).unwrap();
        assert_eq!(list.len(), 2);
        let anmo = list.iter().find(|s| s.name == "ANMO").unwrap();
        assert_eq!(anmo.window_count, 3);
        assert_eq!(anmo.key(), "IU.ANMO.BHZ");
    }

    #[test]
    fn merges_location_codes_and_events() {
        let w = windows(json!({
            "EV1": { "IU.ANMO.00.BHZ": [{}], "IU.ANMO.10.BHZ": [{}, {}] },
            "EV2": { "IU.ANMO.00.BHZ": [{}] },
        }));
        let list = get_stations(&Category::new("17_40", 'Z'), &w, &station_table()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].window_count, 4);
    }

    #[test]
    fn missing_location_is_fatal() {
        let w = windows(json!({ "EV": { "G.CAN.00.BHZ": [{}] } }));
        let err = get_stations(&Category::new("17_40", 'Z'), &w, &station_table()).unwrap_err();
        assert_eq!(
            err,
            WeightError::MissingLocation {
                receiver: "G.CAN".into()
            }
        );
    }

    #[test]
    fn malformed_channel_is_rejected() {
        let w = windows(json!({ "EV": { "IU.ANMO.BHZ": [{}] } }));
        let err = get_stations(&Category::new("17_40", 'Z'), &w, &station_table()).unwrap_err();
        assert!(matches!(err, WeightError::MalformedChannel { .. }));
    }

    #[test]
    fn empty_categories_are_dropped() {
        let w = windows(json!({
            "EV": { "IU.ANMO.00.BHZ": [{}, {}], "II.AAK.00.BHT": [] }
        }));
        let windows = BTreeMap::from([("17_40".to_string(), w)]);
        let cats = vec![
            Category::new("17_40", 'Z'),
            Category::new("17_40", 'T'),
            Category::new("40_100", 'Z'),
        ];
        let catalog = StationCatalog::build(&cats, &station_table(), &windows).unwrap();
        assert_eq!(catalog.category_count(), 1);
        assert_eq!(catalog.measurement_counts()[&Category::new("17_40", 'Z')], 2);

        let weights = catalog.initial_weights();
        let recs = weights.get(&Category::new("17_40", 'Z')).unwrap();
        assert_eq!(recs[0].station, "IU.ANMO.BHZ");
        assert_eq!(recs[0].receiver, 1.0);
        assert_eq!(recs[0].weight, None);
    }
}
