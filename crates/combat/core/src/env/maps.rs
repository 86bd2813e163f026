/// Static description of a map as far as combat cares.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapInfo {
    pub id: String,
    pub name: String,
    /// Players at or below this level are protected from PvP and penalties.
    pub recommended_level: Option<u32>,
    /// Safe maps forbid combat and host respawn waypoints.
    pub safe: bool,
    pub waypoints: Vec<Waypoint>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub id: String,
    pub map_id: String,
    pub x: i32,
    pub y: i32,
}

pub trait MapOracle: Send + Sync {
    fn map(&self, id: &str) -> Option<MapInfo>;

    /// All maps, in a stable order.
    fn maps(&self) -> Vec<MapInfo>;

    fn waypoint(&self, id: &str) -> Option<Waypoint> {
        self.maps()
            .into_iter()
            .flat_map(|m| m.waypoints)
            .find(|w| w.id == id)
    }

    /// The first waypoint of the first safe map; the respawn point of last resort.
    fn fallback_waypoint(&self) -> Option<Waypoint> {
        self.maps()
            .into_iter()
            .filter(|m| m.safe)
            .find_map(|m| m.waypoints.into_iter().next())
    }
}
