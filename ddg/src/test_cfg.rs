// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

#[cfg(test)]
mod tests {
    use crate::cfg::{CfgProvider, MemoryCfg};
    use crate::fixtures::concrete;
    use crate::ir::{BasicBlock, Exit, JumpKind, Run, Statement};

    fn block(addr: u64, successors: &[u64]) -> Run {
        Run::BasicBlock(BasicBlock {
            addr,
            statements: vec![Statement::new(vec![])],
            exits: successors
                .iter()
                .map(|s| Exit {
                    jumpkind: JumpKind::Boring,
                    target: concrete(*s),
                    state: None,
                })
                .collect(),
        })
    }

    #[test]
    fn get_irsb_returns_none_for_unknown_address() {
        let cfg = MemoryCfg::new();
        assert!(cfg.get_irsb(0x1234).is_none());
    }

    #[test]
    fn successors_and_predecessors_reflect_added_edges() {
        let mut cfg = MemoryCfg::new();
        cfg.add_run(block(0x100, &[0x200]));
        cfg.add_run(block(0x200, &[]));
        cfg.add_edge(0x100, 0x200);

        assert_eq!(cfg.get_successors(0x100), vec![0x200]);
        assert_eq!(cfg.get_predecessors(0x200), vec![0x100]);
        assert!(cfg.get_predecessors(0x100).is_empty());
        assert!(cfg.get_successors(0x200).is_empty());
    }

    #[test]
    fn get_irsb_returns_the_stored_run() {
        let mut cfg = MemoryCfg::new();
        cfg.add_run(block(0x100, &[]));
        assert_eq!(cfg.get_irsb(0x100).unwrap().addr(), 0x100);
    }
}
