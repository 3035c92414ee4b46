use super::Coordinate;

/// Seam for the device location service. The platform side owns
/// permissions and update scheduling; this crate only reads the last
/// known coordinate.
pub trait LocationProvider: Send + Sync {
    /// Last known device coordinate. Best-effort: may be stale or absent.
    fn current_coordinate(&self) -> Option<Coordinate>;

    fn start_updates(&self) {}

    fn stop_updates(&self) {}
}

/// A provider pinned to one coordinate, for demos and tests.
pub struct FixedLocation(pub Coordinate);

impl LocationProvider for FixedLocation {
    fn current_coordinate(&self) -> Option<Coordinate> {
        Some(self.0)
    }
}
