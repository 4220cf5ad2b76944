//! Test fixtures for mdout parser testing
//!
//! Builders for realistic mdout text: banner, resource section, control
//! data, coordinates section, results blocks and timings.


/// Banner and resource section that precede the control data
pub fn preamble() -> String {
    r#"
          -------------------------------------------------------
          Amber 20 PMEMD                              2020
          -------------------------------------------------------

| PMEMD implementation of SANDER, Release 18

| Run on 10/18/2026 at 09:12:44

|   Executable path: pmemd.cuda
| Working directory: /scratch/run
|          Hostname: node042

  [-O]verwriting output

File Assignments:
|   MDIN: mdin
|  MDOUT: mdout
| INPCRD: inpcrd

 Here is the input file:

production run
 &cntrl
  imin = 0, irest = 1, ntx = 5,
  nstlim = 500000, dt = 0.002,
 /

--------------------------------------------------------------------------------
   1.  RESOURCE   USE: 
--------------------------------------------------------------------------------

| Flags:
 getting new box info from bottom of inpcrd
| NATOM  =   45963 NTYPES =      17 NBONH =   43422 MBONA  =    2577
|     Largest sphere to fit in unit cell has radius =    38.031
"#
    .to_string()
}

/// Control data section used by most scenarios
pub fn control_data() -> String {
    r#"--------------------------------------------------------------------------------
   2.  CONTROL  DATA  FOR  THE  RUN
--------------------------------------------------------------------------------

default_name                                                                    

General flags:
     imin    =       0, nmropt  =       1

Nature and format of input:
     ntx     =       5, irest   =       1, ntrx    =       1

Nature and format of output:
     ntxo    =       1, ntpr    =     500, ntrx    =       1, ntwr    =     500
     iwrap   =       1, ntwx    =     500, ntwv    =       0, ntwe    =       0
     ioutfm  =       0, ntwprt  =       0, idecomp =       0, rbornstat=      0

Potential function:
     ntf     =       2, ntb     =       2, igb     =       0, nsnb    =      25
     dielc   =   1.00000, cut     =  10.00000, intdiel =   1.00000

Molecular dynamics:
     nstlim  =    500000, nscm    =      1000, nrespa  =         1
     t       =   0.00000, dt      =   0.00200, vlimit  =  20.00000

Langevin dynamics temperature regulation:
     ig      =  631601
     temp0   = 293.00000, tempi   =   0.00000, gamma_ln=   1.00000

Pressure regulation:
     ntp     =       1
     pres0   =   1.00000, comp    =  44.60000, taup    =   5.00000

--------------------------------------------------------------------------------
   3.  ATOMIC COORDINATES AND VELOCITIES
--------------------------------------------------------------------------------

default_name                                                                    
 begin time read from input coords =    50.000 ps

 Number of triangulated 3-point waters found:    14875

--------------------------------------------------------------------------------
   4.  RESULTS
--------------------------------------------------------------------------------

"#
    .to_string()
}

/// One full energy block as printed every `ntpr` steps
pub fn step_block(nstep: i64, temp: f64, eptot: f64) -> String {
    let time = 50.0 + nstep as f64 * 0.002;
    format!(
        " NSTEP = {nstep:>8}   TIME(PS) = {time:>11.3}  TEMP(K) = {temp:>8.2}  PRESS =  -749.1
 Etot   =    -85335.3869  EKtot   =     21219.1275  EPtot      = {eptot:>14.4}
 BOND   =       913.8125  ANGLE   =      3093.9119  DIHED      =         0.0000
 1-4 NB =       -84.7569  1-4 EEL =    -21044.6175  VDWAALS    =      6750.2866
 EELEC  =    -96130.8970  EHBOND  =         0.0000  RESTRAINT  =         0.2673
 EAMBER (non-restraint)  =   -106554.7817
 EKCMT  =      8672.3424  VIRIAL  =     16086.9889  VOLUME     =    458419.0577
                                                    Density    =         0.7750
 Ewald error estimate:   0.2240E-01
 ------------------------------------------------------------------------------

 NMR restraints: Bond =    0.267   Angle =     0.000   Torsion =     0.000
===============================================================================

"
    )
}

/// Average and RMS fluctuation blocks printed at the end of a run
pub fn summary_blocks(last_nstep: i64, steps: usize) -> String {
    let mut text = format!("      A V E R A G E S   O V E R {steps:>7} S T E P S\n\n\n");
    text.push_str(&step_block(last_nstep, 292.29, -106656.8605));
    text.push_str("      R M S  F L U C T U A T I O N S\n\n\n");
    let rms = step_block(last_nstep, 0.56, 80.6000);
    // The RMS block carries an extra reserved line after Density
    let rms = rms.replacen(
        "         0.7750\n",
        "         0.7750\n |E(PBS) =         0.0012\n",
        1,
    );
    text.push_str(&rms);
    text
}

pub fn timings() -> String {
    r#"--------------------------------------------------------------------------------
   5.  TIMINGS
--------------------------------------------------------------------------------

|  NonSetup CPU Time in Major Routines:
|     Elapsed(s) =    1234.56 Per Step(ms) =       2.47
"#
    .to_string()
}

/// Step numbers and EPtot values for `count` regular blocks
pub fn steps(count: usize) -> Vec<(i64, f64)> {
    (1..=count as i64)
        .map(|i| (i * 500, -106554.5 - i as f64))
        .collect()
}

/// Complete mdout log with `count` step blocks, optionally followed by the
/// average/RMS blocks and the timings section
pub fn mdout(count: usize, finished: bool) -> String {
    let mut text = preamble();
    text.push_str(&control_data());
    for (nstep, eptot) in steps(count) {
        text.push_str(&step_block(nstep, 292.08, eptot));
    }
    if finished {
        let last = steps(count).last().map(|(n, _)| *n).unwrap_or(0);
        text.push_str(&summary_blocks(last, count));
        text.push_str(&timings());
    }
    text
}

/// Keys of every step block, in print order
pub const BLOCK_KEYS: &[&str] = &[
    "NSTEP",
    "TIME(PS)",
    "TEMP(K)",
    "PRESS",
    "Etot",
    "EKtot",
    "EPtot",
    "BOND",
    "ANGLE",
    "DIHED",
    "1-4 NB",
    "1-4 EEL",
    "VDWAALS",
    "EELEC",
    "EHBOND",
    "RESTRAINT",
    "EAMBER (non-restraint)",
    "EKCMT",
    "VIRIAL",
    "VOLUME",
    "Density",
];
