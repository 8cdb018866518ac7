/// One entry of the built-in model catalogue. Transforms default to identity.
pub struct CatalogueEntry {
    pub file: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub tags: &'static [&'static str],
    pub group: Option<&'static str>,
}

/// Landing section model. Not part of any project group.
pub const HERO_MODEL: CatalogueEntry = CatalogueEntry {
    file: "tree.glb",
    title: "Tree",
    subtitle: "",
    tags: &[],
    group: None,
};

/// Project models in card order; group `N` belongs to `data-project="N"`.
pub const MODEL_CATALOGUE: &[CatalogueEntry] = &[
    CatalogueEntry {
        file: "bawl.glb",
        title: "Geometric Dreams",
        subtitle: "Abstract 3D composition exploring form and space",
        tags: &["3D Design", "Abstract"],
        group: Some("1"),
    },
    CatalogueEntry {
        file: "half.glb",
        title: "Fluid Motion",
        subtitle: "Dynamic interaction study with organic shapes",
        tags: &["Interactive", "Animation"],
        group: Some("2"),
    },
    CatalogueEntry {
        file: "jarjar.glb",
        title: "Minimal Essence",
        subtitle: "Reductionist approach to 3D visualization",
        tags: &["Minimalism", "Visual"],
        group: Some("3"),
    },
    CatalogueEntry {
        file: "long.glb",
        title: "Digital Sculpture",
        subtitle: "Contemporary digital art meets traditional form",
        tags: &["Sculpture", "Digital Art"],
        group: Some("4"),
    },
    CatalogueEntry {
        file: "oreille.glb",
        title: "Organic Form",
        subtitle: "Exploring natural curves and biomorphic design",
        tags: &["Organic", "Sculpture", "Form"],
        group: Some("5"),
    },
    CatalogueEntry {
        file: "box.glb",
        title: "Cubic Structure",
        subtitle: "Exploring geometric fundamentals and spatial relationships",
        tags: &["Geometry", "Minimal", "Architecture"],
        group: Some("6"),
    },
    CatalogueEntry {
        file: "dragon.glb",
        title: "Mythical Form",
        subtitle: "Organic complexity and detailed surface modeling",
        tags: &["Character", "Organic", "Fantasy"],
        group: Some("7"),
    },
    CatalogueEntry {
        file: "orange.glb",
        title: "Citrus Study",
        subtitle: "Photorealistic texturing and natural form capture",
        tags: &["Photorealism", "Nature", "Texture"],
        group: Some("8"),
    },
    CatalogueEntry {
        file: "scar.glb",
        title: "Surface Detail",
        subtitle: "Intricate surface modeling and material exploration",
        tags: &["Detail", "Material", "Texture"],
        group: Some("9"),
    },
    CatalogueEntry {
        file: "squarecolors.glb",
        title: "Chromatic Grid",
        subtitle: "Color theory application in geometric composition",
        tags: &["Color", "Grid", "Abstract"],
        group: Some("10"),
    },
    CatalogueEntry {
        file: "squaregrey.glb",
        title: "Monochrome Composition",
        subtitle: "Study in grayscale and form without color distraction",
        tags: &["Monochrome", "Minimal", "Study"],
        group: Some("11"),
    },
    CatalogueEntry {
        file: "whiteface.glb",
        title: "Portrait Study",
        subtitle: "Character modeling and facial feature exploration",
        tags: &["Portrait", "Character", "Study"],
        group: Some("12"),
    },
];
