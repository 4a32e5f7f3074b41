//! Pipeline state: the five slots, the in-flight record, hazard detection

use crate::instruction::Instruction;
use crate::instruction::Opcode;

/// Stage indices into the slot array
pub const IF: usize = 0;
pub const ID: usize = 1;
pub const EX: usize = 2;
pub const MEM: usize = 3;
pub const WB: usize = 4;

/// Where a forwarded operand is taken from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Forward {
    #[default]
    None,
    /// Previous cycle's MEM-stage output
    FromMem,
    /// Previous cycle's EX-stage output
    FromEx,
}

/// One in-flight instruction, created at IF and discarded after WB.
/// `inst` is populated at ID; the operand and result fields are each
/// written by the stage that owns them.
#[derive(Clone, Copy, Debug)]
pub struct InFlight {
    /// Raw fetched word
    pub raw: u32,
    /// PC this word was fetched at
    pub pc_at_fetch: u32,
    /// Decoded form, available from ID onwards
    pub inst: Option<Instruction>,
    /// Latched operand A (contents of Rs at ID)
    pub a: i32,
    /// Latched operand B (contents of Rt at ID; loaded word after MEM)
    pub b: i32,
    /// ALU result, written at EX
    pub alu_out: i32,
    /// Effective address for LDW/STW, written at EX
    pub ref_addr: u32,
    /// Forwarding hint for operand A
    pub fwd_a: Forward,
    /// Forwarding hint for operand B
    pub fwd_b: Forward,
    /// Store datum comes from the in-flight load ahead of this store
    pub mem_to_mem: bool,
}

impl InFlight {
    /// Fresh record as IF creates it
    pub fn fetch(raw: u32, pc: u32) -> Self {
        Self {
            raw,
            pc_at_fetch: pc,
            inst: None,
            a: 0,
            b: 0,
            alu_out: 0,
            ref_addr: 0,
            fwd_a: Forward::None,
            fwd_b: Forward::None,
            mem_to_mem: false,
        }
    }
}

/// The pipeline proper: five ordered slots, each empty or holding
/// exactly one in-flight record
#[derive(Default)]
pub struct Pipeline {
    pub slots: [Option<InFlight>; 5],
}

impl Pipeline {
    /// Normal advance: every record moves one slot, IF empties, the old
    /// WB occupant retires
    pub fn advance(&mut self) {
        let [fetch, decode, exec, mem, _retired] = self.slots;
        self.slots = [None, fetch, decode, exec, mem];
    }

    /// Stall advance: IF and ID hold, a bubble enters EX, the old WB
    /// occupant retires
    pub fn stall_advance(&mut self) {
        let [fetch, decode, exec, mem, _retired] = self.slots;
        self.slots = [fetch, decode, None, exec, mem];
    }

    /// Clears the two speculative slots after a control transfer
    pub fn flush_speculative(&mut self) {
        self.slots[IF] = None;
        self.slots[ID] = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Data-hazard scan, run at the end of ID.
    ///
    /// Examines the producers sitting in MEM, then in EX, against the
    /// source registers of the ID-slot instruction. In forwarding mode
    /// it writes hints into the ID record (the EX producer, being
    /// younger, wins); load-use still costs a stall. Returns the number
    /// of cycles to stall (0 for none).
    pub fn detect_hazards(&mut self, forwarding: bool) -> u32 {
        let mem_dest =
            self.slots[MEM].and_then(|p| p.inst).and_then(|i| i.dest_reg());
        let ex_inst = self.slots[EX].and_then(|p| p.inst);
        let ex_dest = ex_inst.and_then(|i| i.dest_reg());
        let ex_is_load = ex_inst.is_some_and(|i| i.opcode == Opcode::Ldw);

        let Some(consumer) = self.slots[ID].as_mut() else { return 0 };
        let Some(inst) = consumer.inst else { return 0 };
        let (src_a, src_b) = inst.src_regs();

        let mut stall = 0;

        if let Some(d) = mem_dest {
            let dep_a = src_a == Some(d);
            let dep_b = src_b == Some(d);
            if forwarding {
                if dep_a {
                    consumer.fwd_a = Forward::FromMem;
                }
                if dep_b {
                    consumer.fwd_b = Forward::FromMem;
                }
            } else if dep_a || dep_b {
                stall = 1;
            }
        }

        if let Some(d) = ex_dest {
            let dep_a = src_a == Some(d);
            let dep_b = src_b == Some(d);
            if dep_a || dep_b {
                if !forwarding {
                    stall = 2;
                } else if ex_is_load {
                    // Load-use: the datum exists only after the load's MEM.
                    // A store consuming it through Rt can instead take the
                    // loaded word straight off the mem latch, with no stall
                    // unless its address also depends on the load.
                    if inst.opcode == Opcode::Stw && dep_b {
                        consumer.mem_to_mem = true;
                        if dep_a {
                            stall = 1;
                        }
                    } else {
                        stall = 1;
                    }
                } else {
                    if dep_a {
                        consumer.fwd_a = Forward::FromEx;
                    }
                    if dep_b {
                        consumer.fwd_b = Forward::FromEx;
                    }
                }
            }
        }

        stall
    }
}
