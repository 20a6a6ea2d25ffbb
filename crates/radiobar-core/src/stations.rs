//! Built-in station table

use serde::Serialize;

/// A selectable stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Station {
    /// Button identifier in the page
    pub id: &'static str,
    /// Stream URL handed to the audio element
    pub url: &'static str,
}

/// The four stations shipped with the app, in button order
pub const STATIONS: [Station; 4] = [
    Station {
        id: "station1",
        url: "https://dispatcher.rndfnk.com/crtve/rner3/main/mp3/high",
    },
    Station {
        id: "station2",
        url: "https://dispatcher.rndfnk.com/crtve/rnerc/main/mp3/high",
    },
    Station {
        id: "station3",
        url: "https://dispatcher.rndfnk.com/crtve/rne5/main/mp3/high",
    },
    Station {
        id: "station4",
        url: "https://dispatcher.rndfnk.com/crtve/rne1/main/mp3/high",
    },
];

/// Station restored when nothing was ever selected
pub const DEFAULT_STATION_URL: &str = STATIONS[0].url;

/// Look up a station by its stream URL
pub fn by_url(url: &str) -> Option<&'static Station> {
    STATIONS.iter().find(|s| s.url == url)
}

/// Look up a station by its button id
pub fn by_id(id: &str) -> Option<&'static Station> {
    STATIONS.iter().find(|s| s.id == id)
}

pub fn is_known(url: &str) -> bool {
    by_url(url).is_some()
}
