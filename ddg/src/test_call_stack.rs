// SPDX-FileCopyrightText: 2024 Rot127 <unisono@quyllur.org>
// SPDX-License-Identifier: LGPL-3.0-only

#[cfg(test)]
mod tests {
    use crate::call_stack::{find_frame_by_addr, pop_frame, push_frame, StackFrame, StackWindow};
    use crate::error::DdgError;

    #[test]
    fn empty_stack_is_fatal() {
        let mut stack = Vec::new();
        let window = StackWindow::new(0x8000_0000, 8192);
        let err = find_frame_by_addr(&mut stack, 0x10, &window, 0x100).unwrap_err();
        assert_eq!(err, DdgError::EmptyCallStack { run: 0x100 });
    }

    #[test]
    fn global_address_bypasses_the_stack_window_to_outermost_frame() {
        let mut stack = vec![StackFrame::new(None), StackFrame::new(Some(0x7fff_ff00))];
        let window = StackWindow::new(0x8000_0000, 8192);
        // 0x4000 is far below the stack window: routed to the outermost frame.
        let frame = find_frame_by_addr(&mut stack, 0x4000, &window, 0x100).unwrap();
        assert_eq!(frame.initial_sp, None);
    }

    #[test]
    fn stack_address_routes_to_innermost_frame_whose_initial_sp_is_above_it() {
        let mut stack = vec![
            StackFrame::new(None),
            StackFrame::new(Some(0x7fff_ff00)), // outer call frame
            StackFrame::new(Some(0x7fff_fe00)), // innermost call frame
        ];
        let window = StackWindow::new(0x8000_0000, 8192);

        // Address above the innermost frame's initial SP but below the
        // middle frame's: belongs to the middle frame.
        let frame = find_frame_by_addr(&mut stack, 0x7fff_ffe8, &window, 0x300).unwrap();
        assert_eq!(frame.initial_sp, Some(0x7fff_ff00));
    }

    #[test]
    fn push_and_pop_frame_round_trip() {
        let mut stack = vec![StackFrame::new(None)];
        push_frame(&mut stack, 0x7fff_ff00);
        assert_eq!(stack.len(), 2);
        let popped = pop_frame(&mut stack).unwrap();
        assert_eq!(popped.initial_sp, Some(0x7fff_ff00));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn pop_frame_on_depth_one_stack_is_rejected() {
        let mut stack = vec![StackFrame::new(None)];
        assert!(pop_frame(&mut stack).is_err());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn stack_window_bounds_are_inclusive() {
        let window = StackWindow::new(0x8000_0000, 8192);
        assert!(window.contains(0x8000_0000));
        assert!(window.contains(0x8000_0000 - 8192));
        assert!(!window.contains(0x8000_0000 + 1));
        assert!(!window.contains(0x8000_0000 - 8193));
    }
}
