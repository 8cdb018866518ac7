/// Duration of one smooth-scroll glide in seconds.
pub const SMOOTH_SCROLL_DURATION: f32 = 1.2;

/// Offset of the exponential easing so that it starts slightly above zero.
pub const SMOOTH_SCROLL_EASE_BIAS: f32 = 1.001;

/// Exponent steepness of the smooth-scroll easing.
pub const SMOOTH_SCROLL_EASE_STEEPNESS: f32 = 10.0;

/// Fraction of the landing section height over which it fades out.
pub const HERO_FADE_SPAN: f32 = 0.8;

/// Opacity lost per unit of landing progress by the canvas and headline.
pub const HERO_CONTENT_FADE_RATE: f32 = 1.5;

/// Opacity lost per unit of landing progress by the scroll indicator.
pub const HERO_INDICATOR_FADE_RATE: f32 = 3.0;

/// Extra scale applied to the landing section at full progress.
pub const HERO_SCALE_GAIN: f32 = 0.1;

/// Offsets closer than this are treated as identical ticks.
pub const SCROLL_EPSILON: f32 = 0.01;

pub const HERO_SECTION: &str = "#hero";
pub const HERO_CANVAS: &str = "#hero-canvas";
pub const HERO_CONTENT: &str = ".hero-content";
pub const SCROLL_INDICATOR: &str = ".scroll-indicator";
pub const GALLERY_SECTION: &str = "#horizontal-scroll";
pub const GALLERY_PROGRESS_BAR: &str = ".progress-bar";
