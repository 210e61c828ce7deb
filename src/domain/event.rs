/// Positioned map triggers and the per-map registry that holds them.
///
/// At most one event sits on any tile, so a first-match lookup is total.
/// Lookup is by exact tile coordinate; probing the tile a character faces
/// is the controller's business, not the registry's.

/// Required key carried by a plain door.
pub const GENERIC_KEY: &str = "KEY";
/// The unique key that gates the endgame.
pub const LEGENDARY_KEY: &str = "LEGENDARY KEY";

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MapEvent {
    /// Collectible item; consumed by searching the tile it sits on.
    Treasure { x: i32, y: i32, item: String },
    /// Door; consumed when opened from its own tile, key-checked when faced.
    Door { x: i32, y: i32, required_key: String },
    /// Teleport to another map, triggered on arrival.
    Warp {
        x: i32,
        y: i32,
        dest_map: usize,
        dest_x: i32,
        dest_y: i32,
    },
}

impl MapEvent {
    pub fn position(&self) -> (i32, i32) {
        match *self {
            MapEvent::Treasure { x, y, .. } => (x, y),
            MapEvent::Door { x, y, .. } => (x, y),
            MapEvent::Warp { x, y, .. } => (x, y),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EventRegistry {
    events: Vec<MapEvent>,
}

impl EventRegistry {
    pub fn new() -> Self {
        EventRegistry { events: Vec::new() }
    }

    pub fn add(&mut self, event: MapEvent) {
        self.events.push(event);
    }

    /// Remove by value. Removing an event that is not present is a no-op.
    pub fn remove(&mut self, event: &MapEvent) {
        if let Some(i) = self.events.iter().position(|e| e == event) {
            self.events.remove(i);
        }
    }

    /// First event at exactly (x, y).
    pub fn event_at(&self, x: i32, y: i32) -> Option<&MapEvent> {
        self.events.iter().find(|e| e.position() == (x, y))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn treasure(x: i32, y: i32, item: &str) -> MapEvent {
        MapEvent::Treasure { x, y, item: item.to_string() }
    }

    #[test]
    fn lookup_by_exact_tile() {
        let mut reg = EventRegistry::new();
        reg.add(treasure(3, 4, "POTION"));
        reg.add(MapEvent::Door { x: 5, y: 4, required_key: GENERIC_KEY.to_string() });

        assert_eq!(reg.event_at(3, 4), Some(&treasure(3, 4, "POTION")));
        assert!(reg.event_at(4, 4).is_none());
        assert!(matches!(reg.event_at(5, 4), Some(MapEvent::Door { .. })));
    }

    #[test]
    fn remove_then_lookup_is_none() {
        let mut reg = EventRegistry::new();
        let e = treasure(2, 2, "HERB");
        reg.add(e.clone());
        reg.remove(&e);
        assert!(reg.event_at(2, 2).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn double_removal_is_a_no_op() {
        let mut reg = EventRegistry::new();
        let e = treasure(1, 1, "SWORD");
        reg.add(e.clone());
        reg.remove(&e);
        reg.remove(&e);
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn removing_an_absent_event_leaves_others() {
        let mut reg = EventRegistry::new();
        reg.add(treasure(1, 1, "SWORD"));
        reg.remove(&treasure(9, 9, "GHOST"));
        assert_eq!(reg.len(), 1);
    }
}
