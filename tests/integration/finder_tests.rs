//! End-to-end: split an assets dump, look GUIDs up, generate a mapping.

use assets_explorer::assets::{
    unpack, write_mapping, AssetFinder, UnpackMode, UnpackOptions,
};
use assets_explorer::cache::{CacheRecord, ResultCache};
use assets_explorer::cli::MapFormat;
use assets_explorer::filter::{apply_blacklist, apply_include, build_pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const ASSETS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<AssetList>
  <Groups>
    <Group>
      <Assets>
        <Asset>
          <Template>Product</Template>
          <Values>
            <Standard><GUID>1010196</GUID><Name>Timber</Name></Standard>
            <Product><ProductCategory>502002</ProductCategory></Product>
          </Values>
        </Asset>
        <Asset>
          <Template>Product</Template>
          <Values>
            <Standard><GUID>1010197</GUID><Name>Planks</Name></Standard>
            <Product><ProductCategory>502002</ProductCategory></Product>
          </Values>
        </Asset>
        <Asset>
          <Template>FactoryBuilding7</Template>
          <Values>
            <Standard><GUID>1010266</GUID><Name>Sawmill</Name></Standard>
            <FactoryBase>
              <FactoryInputs><Item><Product>1010196</Product><Amount>1</Amount></Item></FactoryInputs>
              <FactoryOutputs><Item><Product>1010197</Product><Amount>1</Amount></Item></FactoryOutputs>
            </FactoryBase>
            <Building><SoundGuid>999111</SoundGuid></Building>
          </Values>
        </Asset>
      </Assets>
    </Group>
  </Groups>
</AssetList>
"#;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("assets.xml"), ASSETS_XML).unwrap();
        let project = Self { dir };
        let report = unpack(&UnpackOptions {
            assets_xml: project.path("assets.xml"),
            output_dir: project.path("unpacked"),
            mode: UnpackMode::Templates(None),
            merge: None,
        })
        .unwrap();
        assert_eq!(report.assets, 3);
        assert_eq!(report.files.len(), 2);
        project
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn finder(&self) -> AssetFinder {
        AssetFinder::new(
            ResultCache::open(self.path(".cache/cache.json")),
            self.path("unpacked/templates"),
        )
    }
}

fn cached(path: &Path, guid: &str) -> Option<CacheRecord> {
    ResultCache::open(path).get(guid)
}

#[test]
fn test_unpacked_templates_are_searchable() {
    let project = Project::new();
    let mut finder = project.finder();

    let sawmill = finder.find("1010266").unwrap();
    assert_eq!(sawmill.name, "Sawmill");
    assert_eq!(sawmill.template, "FactoryBuilding7");
    assert_eq!(sawmill.file, "FactoryBuilding7.xml");

    let timber = finder.find(" 1010196 ").unwrap();
    assert_eq!(timber.file, "Product.xml");
}

#[test]
fn test_lookup_backfills_whole_file() {
    let project = Project::new();
    let mut finder = project.finder();
    finder.find("1010196").unwrap();

    // Planks shares Product.xml, so it is cached without being asked for.
    let planks = cached(&project.path(".cache/cache.json"), "1010197");
    assert_eq!(planks.and_then(CacheRecord::into_asset).map(|a| a.name), Some("Planks".to_string()));
}

#[test]
fn test_missing_guid_is_remembered() {
    let project = Project::new();
    let mut finder = project.finder();

    assert!(finder.find("424242").is_none());
    assert!(finder.is_known_missing("424242"));

    // Adding the asset later is not noticed until the marker is cleared.
    fs::write(
        project.path("unpacked/templates/Late.xml"),
        "<Assets><Asset><Template>Late</Template><Values><Standard><GUID>424242</GUID><Name>Late</Name></Standard></Values></Asset></Assets>",
    )
    .unwrap();
    assert!(finder.find("424242").is_none());

    finder.cache_mut().clear_not_found().unwrap();
    assert_eq!(finder.find("424242").unwrap().name, "Late");
}

#[test]
fn test_related_refs_with_filters() {
    let project = Project::new();
    let mut finder = project.finder();

    let related = finder.related("1010266");
    let guids: Vec<&str> = related.iter().map(|r| r.guid.as_str()).collect();
    assert_eq!(guids, vec!["1010196", "1010197", "999111"]);
    assert_eq!(related[0].element_name, "Product");
    assert_eq!(related[0].context, "Item");

    let pattern = build_pattern(&["soundguid"]);
    let visible = apply_blacklist(related.clone(), pattern.as_deref());
    assert_eq!(visible.len(), 2);

    let only_sound = apply_include(related, Some("^Sound"));
    assert_eq!(only_sound.len(), 1);
    assert_eq!(only_sound[0].guid, "999111");
}

#[test]
fn test_unpack_by_guid_and_merge() {
    let project = Project::new();

    let report = unpack(&UnpackOptions {
        assets_xml: project.path("assets.xml"),
        output_dir: project.path("unpacked"),
        mode: UnpackMode::Guids(vec!["1010196".to_string(), "1010266".to_string()]),
        merge: Some("Sawmill chain".to_string()),
    })
    .unwrap();

    assert_eq!(report.assets, 2);
    let merged = fs::read_to_string(project.path("unpacked/merged/Sawmill chain.xml")).unwrap();
    assert!(merged.contains("<Name>Timber</Name>"));
    assert!(merged.contains("<Name>Sawmill</Name>"));
    assert!(!merged.contains("<Name>Planks</Name>"));
}

#[test]
fn test_mapping_from_unpacked_template() {
    let project = Project::new();
    let gen_dir = project.path("gen");

    let (path, count) = write_mapping(
        &project.path("unpacked/templates/Product.xml"),
        &gen_dir,
        MapFormat::Json,
        None,
    )
    .unwrap();

    assert_eq!(count, 2);
    assert_eq!(path, gen_dir.join("product.json"));
    let mapping: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(mapping["Timber"], 1010196);
    assert_eq!(mapping["Planks"], 1010197);
}
