//! Sample-tree fixtures for command tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub(super) const README: &str = "# Display map\n\
\n\
Display a map with an imagery basemap.\n\
\n\
![Image of display map](DisplayMap.png)\n\
\n\
## Relevant API\n\
\n\
* ArcGISMap\n\
* MapView\n\
\n\
## Tags\n\
\n\
basemap, map, MapView\n";

pub(super) fn temp_root(prefix: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "xtask-samples-{prefix}-{}-{}",
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos()
    ));
    fs::create_dir_all(&path).expect("create temp root");
    path
}

pub(super) fn write(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, body).expect("write file");
}

/// Write `<root>/<category>/<name>` with a README, one source file and consistent metadata.
pub(super) fn write_sample(root: &Path, category: &str, name: &str) -> PathBuf {
    let sample = root.join(category).join(name);
    write(&sample.join("README.md"), README);
    write(
        &sample.join("src/main/java/com/esri/samples/display_map/DisplayMapSample.java"),
        "class DisplayMapSample {}\n",
    );
    write(&sample.join("README.metadata.json"), r#"{"redirect_from": []}"#);
    let record = sample_metadata::regenerate(&sample).expect("regenerate fixture");
    record
        .write_to(&sample.join("README.metadata.json"))
        .expect("write fixture metadata");
    sample
}
