/// Sub-path the site is served from on GitHub Pages.
pub const DEPLOYMENT_SUBPATH: &str = "/carved_spirits/";

/// Directory (relative to the deployment base) that static assets are served from.
pub const PUBLIC_DIR: &str = "public";

/// Directory under the asset root holding the GLB files.
pub const MODELS_DIR: &str = "models";

/// Optional registry manifest overriding the built-in catalogue.
pub const REGISTRY_MANIFEST_PATH: &str = "models/registry.json";

/// Name of the DOM `CustomEvent` carrying outbound RPC messages.
pub const RPC_EVENT_NAME: &str = "portfolio-rpc";
