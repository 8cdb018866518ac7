/// X coordinate the gallery models slide in from.
pub const ENTRY_OFFSET_X: f32 = 10.0;

/// X coordinate a gallery model comes to rest on. Gallery models sit on
/// the origin whatever their descriptor offset says.
pub const SETTLE_X: f32 = 0.0;

/// Distance travelled to the left while a model exits.
pub const EXIT_TRAVEL_X: f32 = 15.0;

/// Scale lost while a model exits.
pub const EXIT_SHRINK: f32 = 0.5;

/// Length of the exit window as a fraction of one model's slice.
pub const EXIT_WINDOW_SLICES: f32 = 0.5;
