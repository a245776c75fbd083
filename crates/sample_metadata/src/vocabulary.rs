//! Fixed vocabularies shared by the extractor, the deriver and the CLI.

/// Canonical README filename inside a sample directory.
pub const README_FILE: &str = "README.md";

/// Canonical metadata filename inside a sample directory.
pub const METADATA_FILE: &str = "README.metadata.json";

/// Characters stripped from descriptions before the lenient comparison.
pub const SPECIAL_CHARACTERS: &[char] = &[
    '@', '_', '!', '#', '$', '%', '^', '&', '*', '<', '>', '?', '|', '/', '\\', '}', '{', '~', ':',
];

/// File extensions that count as sample source code.
pub const SOURCE_EXTENSIONS: &[&str] = &["java", "fxml"];

/// Path fragments that mark build output or generated launchers.
pub const EXCLUDED_PATH_FRAGMENTS: &[&str] = &["build/", "out/", "Launcher"];

/// Top-level folders of a samples repository that never hold categories.
pub const IGNORED_FOLDERS: &[&str] = &[".git", ".github", ".gradle", ".idea", "gradle"];

/// Sample category, keyed by its folder name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Category {
    Analysis,
    DisplayInformation,
    Editing,
    FeatureLayers,
    Geometry,
    GroupLayers,
    Hydrography,
    ImageLayers,
    Kml,
    LocalServer,
    Map,
    MapView,
    NetworkAnalysis,
    Ogc,
    Portal,
    Raster,
    RealTime,
    Scene,
    Search,
    Symbology,
    TiledLayers,
    UtilityNetwork,
}

impl Category {
    /// Every category, in folder-name order.
    pub const ALL: [Category; 22] = [
        Category::Analysis,
        Category::DisplayInformation,
        Category::Editing,
        Category::FeatureLayers,
        Category::Geometry,
        Category::GroupLayers,
        Category::Hydrography,
        Category::ImageLayers,
        Category::Kml,
        Category::LocalServer,
        Category::Map,
        Category::MapView,
        Category::NetworkAnalysis,
        Category::Ogc,
        Category::Portal,
        Category::Raster,
        Category::RealTime,
        Category::Scene,
        Category::Search,
        Category::Symbology,
        Category::TiledLayers,
        Category::UtilityNetwork,
    ];

    /// Folder name used in the samples repository.
    pub fn folder_name(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::DisplayInformation => "display_information",
            Self::Editing => "editing",
            Self::FeatureLayers => "feature_layers",
            Self::Geometry => "geometry",
            Self::GroupLayers => "group_layers",
            Self::Hydrography => "hydrography",
            Self::ImageLayers => "image_layers",
            Self::Kml => "kml",
            Self::LocalServer => "local_server",
            Self::Map => "map",
            Self::MapView => "map_view",
            Self::NetworkAnalysis => "network_analysis",
            Self::Ogc => "ogc",
            Self::Portal => "portal",
            Self::Raster => "raster",
            Self::RealTime => "real_time",
            Self::Scene => "scene",
            Self::Search => "search",
            Self::Symbology => "symbology",
            Self::TiledLayers => "tiled_layers",
            Self::UtilityNetwork => "utility_network",
        }
    }

    /// Name shown by the developer site and sample viewer.
    ///
    /// `kml` and `ogc` are acronyms; every other folder becomes a sentence-case phrase, so
    /// `map_view` is shown as `Map view`.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Analysis => "Analysis",
            Self::DisplayInformation => "Display information",
            Self::Editing => "Editing",
            Self::FeatureLayers => "Feature layers",
            Self::Geometry => "Geometry",
            Self::GroupLayers => "Group layers",
            Self::Hydrography => "Hydrography",
            Self::ImageLayers => "Image layers",
            Self::Kml => "KML",
            Self::LocalServer => "Local server",
            Self::Map => "Map",
            Self::MapView => "Map view",
            Self::NetworkAnalysis => "Network analysis",
            Self::Ogc => "OGC",
            Self::Portal => "Portal",
            Self::Raster => "Raster",
            Self::RealTime => "Real time",
            Self::Scene => "Scene",
            Self::Search => "Search",
            Self::Symbology => "Symbology",
            Self::TiledLayers => "Tiled layers",
            Self::UtilityNetwork => "Utility network",
        }
    }

    /// Look up a category by folder name. Matching is exact.
    pub fn from_folder_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.folder_name() == name)
    }
}

/// Return whether `text` contains any of [`SPECIAL_CHARACTERS`].
pub fn contains_special_characters(text: &str) -> bool {
    text.contains(SPECIAL_CHARACTERS)
}

/// Remove every [`SPECIAL_CHARACTERS`] occurrence from `text`.
pub fn strip_special_characters(text: &str) -> String {
    text.chars()
        .filter(|c| !SPECIAL_CHARACTERS.contains(c))
        .collect()
}
