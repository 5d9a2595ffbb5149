//! The [`Component`] marker trait and [`ComponentTypeId`].
//!
//! A component type declares a name; its id is the FNV-1a hash of that name.
//! The registry keys one store per id, so two types declaring the same name
//! collide and the registry reports it as a type mismatch.

/// Registry key for a component type: 64-bit FNV-1a of its declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    /// Hashes `name` byte by byte: xor, then multiply by the FNV prime.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut acc = Self::OFFSET;
        let mut idx = 0;
        while idx < bytes.len() {
            acc = (acc ^ bytes[idx] as u64).wrapping_mul(Self::PRIME);
            idx += 1;
        }
        Self(acc)
    }

    #[must_use]
    pub fn of<T: Component>() -> Self {
        T::component_type_id()
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Data that can be attached to an entity.
///
/// Components are moved onto the loop thread together with the world, hence
/// `Send + 'static`.
///
/// ```rust
/// use engine_component::Component;
///
/// struct Lifetime(f32);
///
/// impl Component for Lifetime {
///     fn type_name() -> &'static str { "Lifetime" }
/// }
/// ```
pub trait Component: Send + 'static {
    /// Name used for the type id and in error messages. Unique per application.
    fn type_name() -> &'static str;

    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }
}
