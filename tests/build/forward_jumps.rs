use crate::helpers::decode_lines;
use rill::module::RawInstr;

#[test]
fn backward_jump_targets_the_recorded_line_index() {
    let code = decode_lines(&["WRITE \"a\"", "JUMP 1"]);
    assert_eq!(code[1], RawInstr::Jump(0));
}

#[test]
fn forward_jump_patches_when_the_line_arrives() {
    let code = decode_lines(&["JUMP 3", "WRITE \"skipped\"", "WRITE \"landed\""]);
    assert_eq!(code[0], RawInstr::Jump(2));
}

#[test]
fn jump_to_its_own_line_loops() {
    let code = decode_lines(&["WRITE \"a\"", "JUMP 2"]);
    assert_eq!(code[1], RawInstr::Jump(1));
}

#[test]
fn jump_past_the_last_line_lands_on_eof() {
    let code = decode_lines(&["JUMP 99", "WRITE \"x\""]);
    let eof_index = (code.len() - 1) as i32;
    assert_eq!(code[0], RawInstr::Jump(eof_index));
}

#[test]
fn several_forward_requests_to_one_line_all_patch() {
    let code = decode_lines(&["JUMP 4", "JUMP 4", "WRITE \"x\"", "WRITE \"target\""]);
    assert_eq!(code[0], RawInstr::Jump(3));
    assert_eq!(code[1], RawInstr::Jump(3));
}

#[test]
fn blank_lines_keep_line_numbers_aligned() {
    let code = decode_lines(&["JUMP 4", "", "", "WRITE \"target\""]);
    assert_eq!(code[0], RawInstr::Jump(3));
    assert_eq!(code[1], RawInstr::Nop);
    assert_eq!(code[2], RawInstr::Nop);
}
