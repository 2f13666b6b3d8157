//! Fixtures shared by the unit and behaviour tests.

use super::*;
use camino::{Utf8Path, Utf8PathBuf};
use mapsift_core::feature::tags;
use mapsift_core::{RawPoint, TileCoord, TileFeatures};
use mapsift_data::MbtilesWriter;
use rusqlite::Connection;
use tempfile::TempDir;

pub(super) const BASE_TILE: TileCoord = TileCoord::new(540, 368, 10);

/// Archive and output database laid out in a temporary directory.
#[derive(Debug)]
pub(super) struct ExtractFiles {
    _dir: TempDir,
    archive: Utf8PathBuf,
    output: Utf8PathBuf,
    env_output: Utf8PathBuf,
}

impl ExtractFiles {
    /// Archive holding one named point in the base tile of [`area_args`].
    pub(super) fn with_point() -> Self {
        let files = Self::empty();
        let mut writer = MbtilesWriter::create(&files.archive).expect("create archive");
        writer
            .insert_tile(
                BASE_TILE,
                &TileFeatures {
                    points: vec![RawPoint::new(
                        10.0,
                        45.0,
                        tags([("elev", "120"), ("name", "X")]),
                    )],
                    ways: Vec::new(),
                },
            )
            .expect("insert tile");
        files
    }

    /// Archive whose base tile is not valid JSON.
    pub(super) fn with_corrupt_tile() -> Self {
        let files = Self::empty();
        let mut writer = MbtilesWriter::create(&files.archive).expect("create archive");
        writer
            .insert_raw(BASE_TILE, b"{not json")
            .expect("insert tile");
        files
    }

    /// Paths only; the archive file is not created.
    pub(super) fn empty() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        Self {
            archive: root.join("area.mbtiles"),
            output: root.join("out/annotations.sqlite"),
            env_output: root.join("env/annotations.sqlite"),
            _dir: dir,
        }
    }

    pub(super) fn archive(&self) -> &Utf8Path {
        &self.archive
    }

    pub(super) fn output(&self) -> &Utf8Path {
        &self.output
    }

    pub(super) fn env_output(&self) -> &Utf8Path {
        &self.env_output
    }
}

/// Arguments covering the 2x2 zoom-10 area around (10.0, 45.0).
pub(super) fn area_args(files: &ExtractFiles) -> ExtractArgs {
    ExtractArgs {
        archive: Some(files.archive().to_path_buf()),
        output: Some(files.output().to_path_buf()),
        north: Some(45.0),
        south: Some(44.7),
        east: Some(10.3),
        west: Some(10.0),
        zoom: Some(10),
        pois: Some(true),
        ..ExtractArgs::default()
    }
}

pub(super) fn count_rows(database: &Utf8Path, table: &str) -> i64 {
    Connection::open(database.as_std_path())
        .expect("open output database")
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .expect("count rows")
}

/// Values a configuration file or the environment would contribute.
#[derive(Debug, Clone, Default)]
pub(super) struct LayerOverrides {
    pub(super) archive: Option<Utf8PathBuf>,
    pub(super) output: Option<Utf8PathBuf>,
    pub(super) zoom: Option<u8>,
}

/// Apply layers with CLI over environment over file precedence, then
/// resolve the configuration without touching the process environment.
pub(super) fn merge_layers(
    mut cli_args: ExtractArgs,
    file_layer: Option<LayerOverrides>,
    env_layer: Option<LayerOverrides>,
) -> Result<ExtractConfig, CliError> {
    merge_field(
        &mut cli_args.archive,
        extract_field(&env_layer, |layer| &layer.archive),
        extract_field(&file_layer, |layer| &layer.archive),
    );
    merge_field(
        &mut cli_args.output,
        extract_field(&env_layer, |layer| &layer.output),
        extract_field(&file_layer, |layer| &layer.output),
    );
    merge_field(
        &mut cli_args.zoom,
        extract_field(&env_layer, |layer| &layer.zoom),
        extract_field(&file_layer, |layer| &layer.zoom),
    );
    ExtractConfig::try_from(cli_args)
}

fn merge_field<T: Clone>(target: &mut Option<T>, env_value: Option<T>, file_value: Option<T>) {
    if target.is_none()
        && let Some(value) = env_value.or(file_value)
    {
        *target = Some(value);
    }
}

fn extract_field<T: Clone>(
    layer: &Option<LayerOverrides>,
    accessor: fn(&LayerOverrides) -> &Option<T>,
) -> Option<T> {
    layer.as_ref().and_then(|entry| accessor(entry).clone())
}
