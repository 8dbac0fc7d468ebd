use glam::{Mat4, Vec2, Vec3, Vec4};

/// Type of a uniform member, with its WGSL uniform-address-space layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    pub fn size(self) -> usize {
        match self {
            UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }

    pub fn align(self) -> usize {
        match self {
            UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 | UniformKind::Vec4 | UniformKind::Mat4 => 16,
        }
    }
}

/// A value written to a named uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    fn write_to(&self, dst: &mut [u8]) {
        match self {
            UniformValue::Float(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => dst.copy_from_slice(bytemuck::bytes_of(&v.to_array())),
            UniformValue::Vec3(v) => dst.copy_from_slice(bytemuck::bytes_of(&v.to_array())),
            UniformValue::Vec4(v) => dst.copy_from_slice(bytemuck::bytes_of(&v.to_array())),
            UniformValue::Mat4(m) => dst.copy_from_slice(bytemuck::bytes_of(&m.to_cols_array())),
        }
    }

    fn read_from(kind: UniformKind, src: &[u8]) -> Self {
        let f = |i: usize| {
            let at = i * 4;
            f32::from_ne_bytes([src[at], src[at + 1], src[at + 2], src[at + 3]])
        };
        match kind {
            UniformKind::Float => UniformValue::Float(f(0)),
            UniformKind::Vec2 => UniformValue::Vec2(Vec2::new(f(0), f(1))),
            UniformKind::Vec3 => UniformValue::Vec3(Vec3::new(f(0), f(1), f(2))),
            UniformKind::Vec4 => UniformValue::Vec4(Vec4::new(f(0), f(1), f(2), f(3))),
            UniformKind::Mat4 => {
                let cols: [f32; 16] = std::array::from_fn(f);
                UniformValue::Mat4(Mat4::from_cols_array(&cols))
            }
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        UniformValue::Mat4(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Member {
    name: String,
    kind: UniformKind,
    offset: usize,
}

/// Ordered members of a program's uniform struct.
///
/// Offsets follow WGSL uniform layout rules, so the block matches a
/// `struct` declared with the same members in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    members: Vec<Member>,
    end: usize,
}

impl UniformLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member. A repeated name is ignored.
    pub fn with(mut self, name: impl Into<String>, kind: UniformKind) -> Self {
        let name = name.into();
        if self.members.iter().any(|m| m.name == name) {
            tracing::warn!(uniform = %name, "duplicate uniform member ignored");
            return self;
        }
        let offset = self.end.next_multiple_of(kind.align());
        self.end = offset + kind.size();
        self.members.push(Member { name, kind, offset });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Byte offset of a member.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.member(name).map(|m| m.offset)
    }

    /// Size of the uniform buffer, rounded up to 16 bytes. Zero when empty.
    pub fn size(&self) -> usize {
        if self.members.is_empty() {
            0
        } else {
            self.end.next_multiple_of(16)
        }
    }

    fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// CPU copy of a program's uniforms, uploaded when dirty.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    bytes: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    /// Zero-initialized block. Starts dirty so the first upload happens.
    pub fn new(layout: UniformLayout) -> Self {
        let bytes = vec![0; layout.size()];
        Self {
            layout,
            bytes,
            dirty: true,
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Set a uniform by name. Returns whether the name and type matched.
    ///
    /// Unknown names and values whose type differs from the declared member
    /// are skipped without error. Writing the value already stored leaves
    /// the block clean.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> bool {
        let value = value.into();
        let Some(member) = self.layout.member(name) else {
            tracing::trace!(uniform = %name, "unknown uniform ignored");
            return false;
        };
        if member.kind != value.kind() {
            tracing::warn!(
                uniform = %name,
                expected = ?member.kind,
                got = ?value.kind(),
                "uniform type mismatch ignored"
            );
            return false;
        }
        let size = member.kind.size();
        let mut encoded = [0u8; 64];
        value.write_to(&mut encoded[..size]);
        let slot = &mut self.bytes[member.offset..member.offset + size];
        if *slot != encoded[..size] {
            slot.copy_from_slice(&encoded[..size]);
            self.dirty = true;
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.layout.member(name).map(|m| {
            UniformValue::read_from(m.kind, &self.bytes[m.offset..m.offset + m.kind.size()])
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bytes to upload if anything changed since the last call.
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        if self.dirty && !self.bytes.is_empty() {
            self.dirty = false;
            Some(&self.bytes)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wgsl_offsets() {
        let layout = UniformLayout::new()
            .with("a", UniformKind::Float)
            .with("b", UniformKind::Vec3)
            .with("c", UniformKind::Float)
            .with("d", UniformKind::Vec2)
            .with("m", UniformKind::Mat4);
        assert_eq!(layout.offset_of("a"), Some(0));
        assert_eq!(layout.offset_of("b"), Some(16));
        // f32 packs into the vec3's trailing padding.
        assert_eq!(layout.offset_of("c"), Some(28));
        assert_eq!(layout.offset_of("d"), Some(32));
        assert_eq!(layout.offset_of("m"), Some(48));
        assert_eq!(layout.size(), 112);
    }

    #[test]
    fn single_float_block_is_sixteen_bytes() {
        let layout = UniformLayout::new().with("mix_value", UniformKind::Float);
        assert_eq!(layout.size(), 16);
        assert_eq!(UniformLayout::new().size(), 0);
    }

    #[test]
    fn duplicate_member_ignored() {
        let layout = UniformLayout::new()
            .with("x", UniformKind::Float)
            .with("x", UniformKind::Vec4);
        assert_eq!(layout.len(), 1);
    }

    #[test]
    fn set_and_get() {
        let mut block = UniformBlock::new(
            UniformLayout::new()
                .with("mix_value", UniformKind::Float)
                .with("tint", UniformKind::Vec4),
        );
        assert!(block.set("mix_value", 0.2_f32));
        assert!(block.set("tint", Vec4::new(1.0, 0.5, 0.25, 1.0)));
        assert_eq!(block.get("mix_value"), Some(UniformValue::Float(0.2)));
        assert_eq!(
            block.get("tint"),
            Some(UniformValue::Vec4(Vec4::new(1.0, 0.5, 0.25, 1.0)))
        );
        assert_eq!(&block.bytes()[0..4], &0.2f32.to_ne_bytes());
    }

    #[test]
    fn unknown_name_is_noop() {
        let mut block =
            UniformBlock::new(UniformLayout::new().with("mix_value", UniformKind::Float));
        block.take_dirty();
        let before = block.bytes().to_vec();
        assert!(!block.set("does_not_exist", 1.0_f32));
        assert_eq!(block.bytes(), &before[..]);
        assert!(!block.is_dirty());
        assert_eq!(block.get("does_not_exist"), None);
    }

    #[test]
    fn type_mismatch_is_noop() {
        let mut block =
            UniformBlock::new(UniformLayout::new().with("mix_value", UniformKind::Float));
        assert!(!block.set("mix_value", Mat4::IDENTITY));
        assert_eq!(block.get("mix_value"), Some(UniformValue::Float(0.0)));
    }

    #[test]
    fn dirty_tracking() {
        let mut block =
            UniformBlock::new(UniformLayout::new().with("mix_value", UniformKind::Float));
        assert!(block.take_dirty().is_some());
        assert!(block.take_dirty().is_none());
        block.set("mix_value", 0.5_f32);
        assert_eq!(block.take_dirty().map(|b| b.len()), Some(16));
    }

    #[test]
    fn same_value_does_not_redirty() {
        let mut block =
            UniformBlock::new(UniformLayout::new().with("mix_value", UniformKind::Float));
        assert!(block.set("mix_value", 0.2_f32));
        assert!(block.take_dirty().is_some());
        assert!(block.set("mix_value", 0.2_f32));
        assert!(!block.is_dirty());
        assert!(block.take_dirty().is_none());
        block.set("mix_value", 0.3_f32);
        assert!(block.is_dirty());
    }

    #[test]
    fn empty_block_never_uploads() {
        let mut block = UniformBlock::new(UniformLayout::new());
        assert!(block.take_dirty().is_none());
        assert!(!block.set("anything", 1.0_f32));
    }

    #[test]
    fn matrix_round_trips_column_major() {
        let mut block = UniformBlock::new(UniformLayout::new().with("m", UniformKind::Mat4));
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        block.set("m", m);
        assert_eq!(block.get("m"), Some(UniformValue::Mat4(m)));
        // Translation lives in the fourth column.
        assert_eq!(&block.bytes()[48..52], &1.0f32.to_ne_bytes());
    }
}
