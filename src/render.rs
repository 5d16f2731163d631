//! Draw output.
//!
//! Draw calls only read state and emit `DrawCommand`s; a renderer outside the
//! core turns them into pixels. Commands come out in paint order, so the
//! same state always yields the same list.

use crate::assets::TextureHandle;
use crate::rect::Rect;

/// Paint layer, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Tiles,
    Enemies,
    RemotePlayer,
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub layer: Layer,
    pub texture: TextureHandle,
    /// Sub-rectangle of the texture to sample
    pub source: Rect,
    /// Where to put it, in world units
    pub dest: Rect,
}

/// Draw commands in paint order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn append(&mut self, mut other: DrawList) {
        self.commands.append(&mut other.commands);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    pub fn count_layer(&self, layer: Layer) -> usize {
        self.commands.iter().filter(|c| c.layer == layer).count()
    }
}

impl<'a> IntoIterator for &'a DrawList {
    type Item = &'a DrawCommand;
    type IntoIter = std::slice::Iter<'a, DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
