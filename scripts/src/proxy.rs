//! The bundled ERC1967 proxy, deployed in front of UUPS implementations when
//! the compilation artifacts include no `ERC1967Proxy` contract
//!
//! The creation code stores the implementation address in the ERC1967
//! implementation slot, emits `Upgraded(implementation)`, and delegatecalls
//! the implementation with the initializer calldata appended to the creation
//! code, bubbling up any revert. The runtime code forwards every call to the
//! implementation stored in the slot, so UUPS upgrades made through the
//! implementation take effect as they would behind OpenZeppelin's proxy.

use alloy_primitives::{keccak256, Address};

use crate::constants::{IMPLEMENTATION_STORAGE_SLOT, UPGRADED_EVENT_SIGNATURE};

// -----------
// | Opcodes |
// -----------

/// `SUB`
const SUB: u8 = 0x03;
/// `ISZERO`
const ISZERO: u8 = 0x15;
/// `CALLDATASIZE`
const CALLDATASIZE: u8 = 0x36;
/// `CALLDATACOPY`
const CALLDATACOPY: u8 = 0x37;
/// `CODESIZE`
const CODESIZE: u8 = 0x38;
/// `CODECOPY`
const CODECOPY: u8 = 0x39;
/// `RETURNDATASIZE`
const RETURNDATASIZE: u8 = 0x3d;
/// `RETURNDATACOPY`
const RETURNDATACOPY: u8 = 0x3e;
/// `SLOAD`
const SLOAD: u8 = 0x54;
/// `SSTORE`
const SSTORE: u8 = 0x55;
/// `JUMPI`
const JUMPI: u8 = 0x57;
/// `GAS`
const GAS: u8 = 0x5a;
/// `JUMPDEST`
const JUMPDEST: u8 = 0x5b;
/// `PUSH1`; `PUSHn` is `PUSH1 + n - 1`
const PUSH1: u8 = 0x60;
/// `PUSH2`
const PUSH2: u8 = 0x61;
/// `DUP1`
const DUP1: u8 = 0x80;
/// `DUP3`
const DUP3: u8 = 0x82;
/// `DUP6`
const DUP6: u8 = 0x85;
/// `LOG2`
const LOG2: u8 = 0xa2;
/// `RETURN`
const RETURN: u8 = 0xf3;
/// `DELEGATECALL`
const DELEGATECALL: u8 = 0xf4;
/// `REVERT`
const REVERT: u8 = 0xfd;

/// Appends instructions to a bytecode buffer, with two-byte jump targets and
/// offsets that are patched once known
#[derive(Default)]
struct Assembler {
    /// The code assembled so far
    code: Vec<u8>,
}

impl Assembler {
    /// Append a single opcode
    fn op(&mut self, op: u8) -> &mut Self {
        self.code.push(op);
        self
    }

    /// Push a value of 1 to 32 bytes
    fn push(&mut self, value: &[u8]) -> &mut Self {
        debug_assert!((1..=32).contains(&value.len()));
        self.code.push(PUSH1 + value.len() as u8 - 1);
        self.code.extend_from_slice(value);
        self
    }

    /// Push a zero byte
    fn push0(&mut self) -> &mut Self {
        // `PUSH1 0` rather than `PUSH0`, which pre-Shanghai chains lack
        self.push(&[0])
    }

    /// Push a two-byte placeholder, returning its position for [`Self::patch`]
    fn placeholder(&mut self) -> usize {
        self.code.push(PUSH2);
        self.code.extend_from_slice(&[0, 0]);
        self.code.len() - 2
    }

    /// Append a jump destination, returning its offset
    fn jumpdest(&mut self) -> u16 {
        let offset = self.offset();
        self.code.push(JUMPDEST);
        offset
    }

    /// Fill in a placeholder
    fn patch(&mut self, at: usize, value: u16) {
        self.code[at..at + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// The offset of the next instruction
    fn offset(&self) -> u16 {
        self.code.len() as u16
    }
}

/// The runtime code of the proxy: delegate every call to the implementation
/// in the ERC1967 slot, returning or reverting with its return data
pub fn runtime_code() -> Vec<u8> {
    let mut asm = Assembler::default();

    // calldatacopy(0, 0, calldatasize())
    asm.op(CALLDATASIZE).push0().push0().op(CALLDATACOPY);

    // delegatecall(gas(), sload(slot), 0, calldatasize(), 0, 0)
    asm.push0()
        .push0()
        .op(CALLDATASIZE)
        .push0()
        .push(IMPLEMENTATION_STORAGE_SLOT.as_slice())
        .op(SLOAD)
        .op(GAS)
        .op(DELEGATECALL);

    // returndatacopy(0, 0, returndatasize())
    asm.op(RETURNDATASIZE).push0().push0().op(RETURNDATACOPY);

    let success = asm.placeholder();
    asm.op(JUMPI);
    asm.op(RETURNDATASIZE).push0().op(REVERT);

    let ret = asm.jumpdest();
    asm.patch(success, ret);
    asm.op(RETURNDATASIZE).push0().op(RETURN);

    asm.code
}

/// The creation code of a proxy in front of `implementation`, calling it with
/// `init_data` during construction if that is non-empty
pub fn creation_code(implementation: Address, init_data: &[u8]) -> Vec<u8> {
    let runtime = runtime_code();
    let runtime_len = (runtime.len() as u16).to_be_bytes();
    let upgraded = keccak256(UPGRADED_EVENT_SIGNATURE);
    let mut asm = Assembler::default();

    // sstore(slot, implementation); the stack keeps the implementation
    asm.push(implementation.as_slice())
        .op(DUP1)
        .push(IMPLEMENTATION_STORAGE_SLOT.as_slice())
        .op(SSTORE);

    // log2(0, 0, Upgraded, implementation)
    asm.op(DUP1).push(upgraded.as_slice()).push0().push0().op(LOG2);

    // The init data is everything after the creation prefix
    let data_len_offset = asm.placeholder();
    asm.op(CODESIZE).op(SUB).op(DUP1).op(ISZERO);
    let skip_call = asm.placeholder();
    asm.op(JUMPI);

    // codecopy(0, prefix_len, data_len)
    asm.op(DUP1);
    let data_offset = asm.placeholder();
    asm.push0().op(CODECOPY);

    // delegatecall(gas(), implementation, 0, data_len, 0, 0)
    asm.push0()
        .push0()
        .op(DUP3)
        .push0()
        .op(DUP6)
        .op(GAS)
        .op(DELEGATECALL);
    let call_succeeded = asm.placeholder();
    asm.op(JUMPI);

    asm.op(RETURNDATASIZE)
        .push0()
        .push0()
        .op(RETURNDATACOPY)
        .op(RETURNDATASIZE)
        .push0()
        .op(REVERT);

    let deploy = asm.jumpdest();
    asm.patch(skip_call, deploy);
    asm.patch(call_succeeded, deploy);

    // codecopy(0, runtime_offset, runtime_len); return(0, runtime_len)
    asm.push(&runtime_len);
    let runtime_offset = asm.placeholder();
    asm.push0().op(CODECOPY);
    asm.push(&runtime_len).push0().op(RETURN);

    let runtime_start = asm.offset();
    asm.patch(runtime_offset, runtime_start);
    asm.code.extend_from_slice(&runtime);

    let prefix_len = asm.offset();
    asm.patch(data_len_offset, prefix_len);
    asm.patch(data_offset, prefix_len);
    asm.code.extend_from_slice(init_data);

    asm.code
}
