// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

#[cfg(test)]
mod tests {
    use crate::addr_map::AddrMap;

    #[test]
    fn lookup_on_empty_map_misses() {
        let map = AddrMap::new();
        assert_eq!(map.lookup(0x10), None);
    }

    #[test]
    fn record_write_then_lookup_hits() {
        let mut map = AddrMap::new();
        map.record_write(0x10, 0x100, 0);
        assert_eq!(map.lookup(0x10), Some((0x100, 0)));
    }

    #[test]
    fn record_write_reports_change_only_when_writer_differs() {
        let mut map = AddrMap::new();
        assert!(map.record_write(0x10, 0x100, 0));
        // Same writer recorded again: no change.
        assert!(!map.record_write(0x10, 0x100, 0));
        // Different statement in the same run: a change.
        assert!(map.record_write(0x10, 0x100, 1));
        assert_eq!(map.lookup(0x10), Some((0x100, 1)));
    }

    #[test]
    fn last_write_wins_within_one_frame() {
        let mut map = AddrMap::new();
        map.record_write(0x10, 0x100, 0);
        map.record_write(0x10, 0x200, 3);
        assert_eq!(map.lookup(0x10), Some((0x200, 3)));
    }
}
