use std::fmt;

use serde::{Deserialize, Serialize};

use rand::{Rng, RngCore};

use crate::error::ConfigError;

/// Opaque handle for a loaded texture: its index in the [`TextureAtlas`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u16);

impl TextureId {
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The textures a reel may show, in the order backend results index them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureAtlas {
    keys: Vec<String>,
}

impl TextureAtlas {
    pub fn new<I, S>(keys: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(ConfigError::EmptyAtlas);
        }
        if keys.len() > usize::from(u16::MAX) + 1 {
            return Err(ConfigError::AtlasTooLarge(keys.len()));
        }
        Ok(Self { keys })
    }

    /// The four symbol sprites shipped with the game.
    pub fn default_set() -> Self {
        Self {
            keys: [
                "assets/eggHead.png",
                "assets/flowerTop.png",
                "assets/helmlok.png",
                "assets/skully.png",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TextureId> {
        (index < self.keys.len()).then(|| TextureId(index as u16))
    }

    pub fn key(&self, id: TextureId) -> Option<&str> {
        self.keys.get(id.index()).map(String::as_str)
    }

    /// Uniform draw over every texture.
    pub fn random(&self, rng: &mut dyn RngCore) -> TextureId {
        TextureId(rng.gen_range(0..self.keys.len()) as u16)
    }
}

/// One sprite of a reel: which texture it shows and where it currently sits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolUnit {
    pub texture: TextureId,
    /// Vertical offset in pixels from the top of the visible window.
    pub y: f64,
}

impl SymbolUnit {
    pub fn new(texture: TextureId) -> Self {
        Self { texture, y: 0.0 }
    }

    pub fn swap_texture(&mut self, texture: TextureId) {
        self.texture = texture;
    }
}
