use constants::paths::{DEPLOYMENT_SUBPATH, MODELS_DIR, PUBLIC_DIR};

/// Deployment base for a page path: the GitHub Pages sub-path when the page
/// is served from it, otherwise the site root.
pub fn deployment_base(pathname: &str) -> &'static str {
    if pathname.contains(DEPLOYMENT_SUBPATH) {
        DEPLOYMENT_SUBPATH
    } else {
        "/"
    }
}

/// Asset server root for a page path, e.g. `/carved_spirits/public`.
pub fn asset_root(pathname: &str) -> String {
    format!("{}{}", deployment_base(pathname), PUBLIC_DIR)
}

/// Asset path of a model file relative to the asset root.
pub fn model_asset_path(file: &str) -> String {
    format!("{}/{}", MODELS_DIR, file.trim_start_matches('/'))
}

/// Asset root for the running page. Native builds read from `public/`
/// next to the working directory.
pub fn current_asset_root() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        let pathname = crate::web::dom::location_pathname().unwrap_or_default();
        asset_root(&pathname)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        PUBLIC_DIR.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_path_deployment_is_detected() {
        assert_eq!(deployment_base("/carved_spirits/index.html"), "/carved_spirits/");
        assert_eq!(deployment_base("/carved_spirits/"), "/carved_spirits/");
        assert_eq!(deployment_base("/index.html"), "/");
        assert_eq!(deployment_base(""), "/");
    }

    #[test]
    fn model_paths_sit_under_the_public_models_directory() {
        assert_eq!(asset_root("/carved_spirits/"), "/carved_spirits/public");
        assert_eq!(asset_root("/"), "/public");
        assert_eq!(model_asset_path("box.glb"), "models/box.glb");
        assert_eq!(model_asset_path("/box.glb"), "models/box.glb");
    }
}
