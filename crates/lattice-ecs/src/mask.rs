use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use tracing::debug;

use crate::component::Component;
use crate::error::EcsError;

/// A set of component types, one bit per type.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComponentMask(u64);

impl ComponentMask {
    pub const EMPTY: ComponentMask = ComponentMask(0);

    /// How many distinct component types a mask can describe.
    pub const WIDTH: u32 = u64::BITS;

    /// A mask with only `bit` set. `bit` must be below [`Self::WIDTH`].
    pub const fn from_bit(bit: u32) -> Self {
        Self(1 << bit)
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// True if every bit of `other` is also set in `self`.
    pub const fn contains(self, other: ComponentMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of component types in the mask.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Indices of the set bits, lowest first.
    pub fn iter_bits(self) -> impl Iterator<Item = u32> {
        (0..Self::WIDTH).filter(move |&bit| self.0 & (1 << bit) != 0)
    }
}

impl BitOr for ComponentMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ComponentMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ComponentMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentMask({:#b})", self.0)
    }
}

/// Assigns each component type a stable bit, in order of first request.
///
/// Bits are never reassigned or reused. Assignment order is only meaningful
/// within one registry; masks are not comparable across worlds or runs.
pub struct ComponentRegistry {
    bits: HashMap<TypeId, u32>,
    /// Type names indexed by bit, for diagnostics.
    names: Vec<&'static str>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            bits: HashMap::new(),
            names: Vec::new(),
        }
    }

    /// The mask bit for `T`, assigning the next free bit on first use.
    pub fn get_or_assign<T: Component>(&mut self) -> Result<ComponentMask, EcsError> {
        if let Some(&bit) = self.bits.get(&TypeId::of::<T>()) {
            return Ok(ComponentMask::from_bit(bit));
        }

        let bit = self.names.len() as u32;
        if bit >= ComponentMask::WIDTH {
            return Err(EcsError::MaskCapacityExceeded {
                component: type_name::<T>(),
                capacity: ComponentMask::WIDTH,
            });
        }

        self.bits.insert(TypeId::of::<T>(), bit);
        self.names.push(type_name::<T>());
        debug!(component = type_name::<T>(), bit, "assigned component bit");
        Ok(ComponentMask::from_bit(bit))
    }

    /// The mask bit for `T` if it has been assigned.
    pub fn mask_of<T: Component>(&self) -> Option<ComponentMask> {
        self.bits
            .get(&TypeId::of::<T>())
            .map(|&bit| ComponentMask::from_bit(bit))
    }

    /// The type name that owns `bit`.
    pub fn name_of_bit(&self, bit: u32) -> Option<&'static str> {
        self.names.get(bit as usize).copied()
    }

    /// Type names of every component in `mask` that this registry knows.
    pub fn describe(&self, mask: ComponentMask) -> Vec<&'static str> {
        mask.iter_bits()
            .filter_map(|bit| self.name_of_bit(bit))
            .collect()
    }

    /// Number of component types assigned so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;
    struct Velocity;
    struct Health;

    /// Distinct zero-sized component types for capacity tests.
    struct Marker<const N: usize>;

    macro_rules! assign_markers {
        ($registry:expr; $($n:literal)+) => {
            $($registry.get_or_assign::<Marker<$n>>().unwrap();)+
        };
    }

    #[test]
    fn bits_assigned_in_first_use_order() {
        let mut registry = ComponentRegistry::new();
        assert_eq!(
            registry.get_or_assign::<Velocity>().unwrap(),
            ComponentMask::from_bit(0)
        );
        assert_eq!(
            registry.get_or_assign::<Position>().unwrap(),
            ComponentMask::from_bit(1)
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn assignment_is_idempotent() {
        let mut registry = ComponentRegistry::new();
        let first = registry.get_or_assign::<Position>().unwrap();
        registry.get_or_assign::<Velocity>().unwrap();
        let again = registry.get_or_assign::<Position>().unwrap();
        assert_eq!(first, again);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn masks_are_distinct_single_bits() {
        let mut registry = ComponentRegistry::new();
        let masks = [
            registry.get_or_assign::<Position>().unwrap(),
            registry.get_or_assign::<Velocity>().unwrap(),
            registry.get_or_assign::<Health>().unwrap(),
        ];
        for (i, a) in masks.iter().enumerate() {
            assert_eq!(a.count(), 1);
            for b in &masks[i + 1..] {
                assert!((*a & *b).is_empty());
            }
        }
    }

    #[test]
    fn mask_of_does_not_assign() {
        let mut registry = ComponentRegistry::new();
        assert_eq!(registry.mask_of::<Health>(), None);
        let bit = registry.get_or_assign::<Health>().unwrap();
        assert_eq!(registry.mask_of::<Health>(), Some(bit));
    }

    #[test]
    fn describe_names_bits() {
        let mut registry = ComponentRegistry::new();
        let mask = registry.get_or_assign::<Position>().unwrap()
            | registry.get_or_assign::<Health>().unwrap();
        let names = registry.describe(mask);
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("Position"));
        assert!(names[1].ends_with("Health"));
    }

    #[test]
    fn capacity_exceeded_is_an_error() {
        let mut registry = ComponentRegistry::new();
        assign_markers!(registry;
            0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
            16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31
            32 33 34 35 36 37 38 39 40 41 42 43 44 45 46 47
            48 49 50 51 52 53 54 55 56 57 58 59 60 61 62 63
        );
        assert_eq!(registry.len(), 64);
        assert_eq!(
            registry.mask_of::<Marker<63>>(),
            Some(ComponentMask::from_bits(1 << 63))
        );

        let err = registry.get_or_assign::<Position>().unwrap_err();
        assert!(matches!(
            err,
            EcsError::MaskCapacityExceeded { capacity: 64, .. }
        ));
        // Known types still resolve after the overflow.
        assert!(registry.get_or_assign::<Marker<0>>().is_ok());
        assert_eq!(registry.len(), 64);
    }

    #[test]
    fn contains_is_superset_test() {
        let a = ComponentMask::from_bit(0);
        let b = ComponentMask::from_bit(2);
        assert!((a | b).contains(a));
        assert!((a | b).contains(a | b));
        assert!(!a.contains(a | b));
        assert!(a.contains(ComponentMask::EMPTY));
    }
}
