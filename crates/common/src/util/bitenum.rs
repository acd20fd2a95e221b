// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::marker::PhantomData;
use std::ops::{BitOr, BitOrAssign};

use num_traits::ToPrimitive;

/// A barebones minimal bitset over a primitive-derived enum. Used for attribute definition flags
/// and object flags.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct BitEnum<T: ToPrimitive> {
    value: u32,
    phantom: PhantomData<T>,
}

impl<T: ToPrimitive> BitEnum<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: 0,
            phantom: PhantomData,
        }
    }

    #[must_use]
    pub fn to_u32(&self) -> u32 {
        self.value
    }

    #[must_use]
    pub fn from_u32(value: u32) -> Self {
        Self {
            value,
            phantom: PhantomData,
        }
    }

    pub fn new_with(value: T) -> Self {
        let mut s = Self::new();
        s.set(value);
        s
    }

    #[must_use]
    pub fn all() -> Self {
        Self::from_u32(u32::MAX)
    }

    fn bit(value: &T) -> u32 {
        // Variants are declared with small discriminants; anything else is a programming error in
        // the enum declaration, so it maps to no bit at all.
        value
            .to_u32()
            .filter(|b| *b < u32::BITS)
            .map_or(0, |b| 1 << b)
    }

    pub fn set(&mut self, value: T) {
        self.value |= Self::bit(&value);
    }

    pub fn clear(&mut self, value: T) {
        self.value &= !Self::bit(&value);
    }

    pub fn contains(&self, value: T) -> bool {
        let bit = Self::bit(&value);
        bit != 0 && self.value & bit != 0
    }

    pub fn contains_all(&self, values: BitEnum<T>) -> bool {
        values.value & self.value == values.value
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value == 0
    }
}

impl<T: ToPrimitive> BitOr for BitEnum<T> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_u32(self.value | rhs.value)
    }
}

impl<T: ToPrimitive> Default for BitEnum<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ToPrimitive> BitOrAssign<T> for BitEnum<T> {
    fn bitor_assign(&mut self, rhs: T) {
        self.set(rhs);
    }
}

impl<T: ToPrimitive> BitOr<T> for BitEnum<T> {
    type Output = Self;

    fn bitor(self, rhs: T) -> Self::Output {
        let mut s = self;
        s.set(rhs);
        s
    }
}

impl<T: ToPrimitive> From<T> for BitEnum<T> {
    fn from(value: T) -> Self {
        Self::new_with(value)
    }
}

impl<T: ToPrimitive> FromIterator<T> for BitEnum<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut s = Self::new();
        for v in iter {
            s.set(v);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::BitEnum;
    use crate::model::AttrFlag;

    #[test]
    fn test_set_clear_contains() {
        let mut flags = BitEnum::new_with(AttrFlag::Inherit);
        assert!(flags.contains(AttrFlag::Inherit));
        assert!(!flags.contains(AttrFlag::Lock));
        flags |= AttrFlag::Lock;
        assert!(flags.contains(AttrFlag::Lock));
        flags.clear(AttrFlag::Inherit);
        assert!(!flags.contains(AttrFlag::Inherit));
        assert!(flags.contains_all(BitEnum::new_with(AttrFlag::Lock)));
    }

    #[test]
    fn test_collect() {
        let flags: BitEnum<AttrFlag> = [AttrFlag::Dark, AttrFlag::Osee].into_iter().collect();
        assert!(flags.contains(AttrFlag::Dark));
        assert!(flags.contains(AttrFlag::Osee));
        assert!(!flags.is_empty());
    }
}
