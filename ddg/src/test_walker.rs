// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

#[cfg(test)]
mod tests {
    use crate::call_stack::{CallStack, StackFrame, StackWindow};
    use crate::cfg::MemoryCfg;
    use crate::config::DdgConfig;
    use crate::fixtures::{boring_exit, concrete, mem_write, symbolic, CapturingLog, IdentityEngine, TestState};
    use crate::ir::{BasicBlock, Run, Statement};
    use crate::walker::ForwardWalker;

    fn loop_cfg() -> MemoryCfg {
        let mut cfg = MemoryCfg::new();
        cfg.add_run(Run::BasicBlock(BasicBlock {
            addr: 0x100,
            statements: vec![Statement::new(vec![mem_write(concrete(0x10))])],
            exits: vec![boring_exit(0x200)],
        }));
        cfg.add_run(Run::BasicBlock(BasicBlock {
            addr: 0x200,
            statements: vec![Statement::new(vec![mem_write(concrete(0x10))])],
            exits: vec![boring_exit(0x100)],
        }));
        cfg.add_edge(0x100, 0x200);
        cfg.add_edge(0x200, 0x100);
        cfg
    }

    #[test]
    fn rescan_budget_caps_at_one_past_the_configured_max() {
        // S5: an A<->B loop where both blocks write the same concrete
        // address, so every visit toggles the last writer and forces
        // `reanalyze_successors`. The walker must still terminate, with
        // `scanned[addr] == max_bbl_analyze_times + 1`.
        let cfg = loop_cfg();
        let engine = IdentityEngine;
        let log = CapturingLog::default();
        let config = DdgConfig::default();
        let window = StackWindow::new(0x8000_0000, config.stack_window_bytes);

        let mut walker = ForwardWalker::new(&cfg, &engine, &log, &config, window);
        let stack: CallStack = vec![StackFrame::new(None)];
        walker.seed(0x100, Some(TestState::concrete(0x8000_0000)), stack);
        walker.run().unwrap();

        assert_eq!(walker.scanned_count(0x100), config.max_bbl_analyze_times + 1);
        assert_eq!(walker.scanned_count(0x200), config.max_bbl_analyze_times + 1);
    }

    #[test]
    fn basic_block_with_no_references_produces_no_ddg_entries() {
        let mut cfg = MemoryCfg::new();
        cfg.add_run(Run::BasicBlock(BasicBlock {
            addr: 0x100,
            statements: vec![Statement::new(vec![])],
            exits: vec![],
        }));
        let engine = IdentityEngine;
        let log = CapturingLog::default();
        let config = DdgConfig::default();
        let window = StackWindow::new(0x8000_0000, config.stack_window_bytes);

        let mut walker = ForwardWalker::new(&cfg, &engine, &log, &config, window);
        walker.seed(
            0x100,
            Some(TestState::concrete(0x8000_0000)),
            vec![StackFrame::new(None)],
        );
        walker.run().unwrap();
        let (ddg, symbolic_ops) = walker.into_parts();
        assert!(symbolic_ops.is_empty());
        assert!(ddg.writers_of(0x100, 0).is_empty());
    }

    #[test]
    fn symbolic_write_is_collected_for_later_reconciliation() {
        let mut cfg = MemoryCfg::new();
        cfg.add_run(Run::BasicBlock(BasicBlock {
            addr: 0x100,
            statements: vec![Statement::new(vec![mem_write(symbolic())])],
            exits: vec![],
        }));
        let engine = IdentityEngine;
        let log = CapturingLog::default();
        let config = DdgConfig::default();
        let window = StackWindow::new(0x8000_0000, config.stack_window_bytes);

        let mut walker = ForwardWalker::new(&cfg, &engine, &log, &config, window);
        walker.seed(
            0x100,
            Some(TestState::concrete(0x8000_0000)),
            vec![StackFrame::new(None)],
        );
        walker.run().unwrap();
        let (_ddg, symbolic_ops) = walker.into_parts();
        assert_eq!(symbolic_ops.len(), 1);
        let ((run, stmt, _pos), reference) = symbolic_ops.iter().next().unwrap();
        assert_eq!(*run, 0x100);
        assert_eq!(*stmt, 0);
        assert!(reference.is_mem_write());
    }
}
