//! Prebuilt tile assets and the loaders that fetch them by name.

use std::io;
use std::path::{Path, PathBuf};
use std::task::Poll;

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use terrastream_terrain::Heightfield;

use crate::coord::TileCoord;
use crate::error::AssetError;

/// Name of the child node that carries the tile's terrain.
pub const TERRAIN_NODE: &str = "Terrain";

/// Loads queued ahead of the asset thread before `load_named` refuses.
const QUEUE_CAPACITY: usize = 8;

/// Asset name for a tile: `Map_{x}-{y}`.
pub fn asset_name(coord: TileCoord) -> String {
    format!("Map_{}-{}", coord.x, coord.y)
}

/// A child object of a tile asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetNode {
    pub name: String,
    #[serde(default)]
    pub terrain: Option<Heightfield>,
}

/// Root of a prebuilt tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileAsset {
    pub name: String,
    #[serde(default)]
    pub children: Vec<AssetNode>,
}

impl TileAsset {
    /// An asset whose `Terrain` child carries `heightfield`.
    pub fn with_terrain(name: impl Into<String>, heightfield: Heightfield) -> Self {
        Self {
            name: name.into(),
            children: vec![AssetNode {
                name: TERRAIN_NODE.to_owned(),
                terrain: Some(heightfield),
            }],
        }
    }

    /// The heightfield of the `Terrain` child, if present.
    pub fn find_terrain(&self) -> Option<&Heightfield> {
        self.children
            .iter()
            .find(|node| node.name == TERRAIN_NODE)
            .and_then(|node| node.terrain.as_ref())
    }

    pub fn into_terrain(self) -> Option<Heightfield> {
        self.children
            .into_iter()
            .find(|node| node.name == TERRAIN_NODE)
            .and_then(|node| node.terrain)
    }
}

/// Asynchronous fetch of named tile assets.
///
/// `load_named` starts a load; `poll` is called once per tick until it
/// returns `Ready`.
pub trait ResourceLoader {
    fn load_named(&mut self, name: &str) -> Result<(), AssetError>;

    fn poll(&mut self, name: &str) -> Poll<Result<TileAsset, AssetError>>;
}

/// Loads `<dir>/<name>.ron` files on a background thread.
pub struct DirectoryLoader {
    dir: PathBuf,
    request_sender: Sender<String>,
    result_receiver: Receiver<(String, Result<TileAsset, AssetError>)>,
    outstanding: FxHashSet<String>,
    ready: FxHashMap<String, Result<TileAsset, AssetError>>,
}

impl DirectoryLoader {
    /// Start the loader thread for assets under `dir`.
    pub fn spawn(dir: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let dir = dir.into();
        let (request_sender, request_receiver) = bounded::<String>(QUEUE_CAPACITY);
        let (result_sender, result_receiver) = bounded(QUEUE_CAPACITY);

        let thread_dir = dir.clone();
        std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                while let Ok(name) = request_receiver.recv() {
                    let result = read_asset(&thread_dir, &name);
                    if result_sender.send((name, result)).is_err() {
                        break;
                    }
                }
                tracing::debug!("asset loader shutting down");
            })
            .map_err(AssetError::Spawn)?;

        tracing::info!(dir = %dir.display(), "asset loader started");
        Ok(Self {
            dir,
            request_sender,
            result_receiver,
            outstanding: FxHashSet::default(),
            ready: FxHashMap::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn drain(&mut self) -> Result<(), AssetError> {
        loop {
            match self.result_receiver.try_recv() {
                Ok((name, result)) => {
                    self.outstanding.remove(&name);
                    self.ready.insert(name, result);
                }
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(AssetError::Unavailable),
            }
        }
    }
}

impl ResourceLoader for DirectoryLoader {
    fn load_named(&mut self, name: &str) -> Result<(), AssetError> {
        if self.outstanding.contains(name) || self.ready.contains_key(name) {
            return Ok(());
        }
        self.request_sender
            .try_send(name.to_owned())
            .map_err(|_| AssetError::Unavailable)?;
        self.outstanding.insert(name.to_owned());
        Ok(())
    }

    fn poll(&mut self, name: &str) -> Poll<Result<TileAsset, AssetError>> {
        if let Err(err) = self.drain()
            && !self.ready.contains_key(name)
        {
            return Poll::Ready(Err(err));
        }
        if let Some(result) = self.ready.remove(name) {
            return Poll::Ready(result);
        }
        if self.outstanding.contains(name) {
            Poll::Pending
        } else {
            Poll::Ready(Err(AssetError::NotFound(name.to_owned())))
        }
    }
}

fn read_asset(dir: &Path, name: &str) -> Result<TileAsset, AssetError> {
    let path = dir.join(format!("{name}.ron"));
    let contents = std::fs::read_to_string(&path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            AssetError::NotFound(name.to_owned())
        } else {
            AssetError::Io {
                name: name.to_owned(),
                source,
            }
        }
    })?;
    ron::from_str(&contents).map_err(|source| AssetError::Parse {
        name: name.to_owned(),
        source,
    })
}
