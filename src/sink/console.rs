//! Periodic console pose dump.

use super::PoseSink;
use crate::core::rotation::quaternion_to_rotation_matrix;
use crate::core::types::PoseReport;
use crate::error::Result;
use std::io::{self, Stdout, Write};

/// Render position, `(x, y, z, w)` quaternion and rotation matrix.
pub fn format_pose(report: &PoseReport) -> String {
    let [px, py, pz] = report.position;
    let [x, y, z, w] = report.quaternion;
    let m = quaternion_to_rotation_matrix(w, x, y, z);

    let mut out = format!(
        "Tracker {} [seq {}]\n  Position: ({:.3}, {:.3}, {:.3})\n  Quaternion (x, y, z, w): ({:.3}, {:.3}, {:.3}, {:.3})\n  Rotation matrix:\n",
        report.object_name, report.sequence, px, py, pz, x, y, z, w
    );
    for row in &m {
        out.push_str(&format!(
            "    [{:>7.3} {:>7.3} {:>7.3}]\n",
            row[0], row[1], row[2]
        ));
    }
    out
}

/// Writes every `print_every`-th report to a writer (stdout by default).
/// A `print_every` of 0 writes nothing.
pub struct ConsoleSink<W: Write + Send = Stdout> {
    writer: W,
    print_every: u64,
    count: u64,
}

impl ConsoleSink<Stdout> {
    pub fn stdout(print_every: u32) -> Self {
        Self::new(io::stdout(), print_every)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(writer: W, print_every: u32) -> Self {
        Self {
            writer,
            print_every: u64::from(print_every),
            count: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> PoseSink for ConsoleSink<W> {
    fn publish(&mut self, report: &PoseReport) -> Result<()> {
        if self.print_every == 0 {
            return Ok(());
        }
        self.count += 1;
        if self.count % self.print_every != 0 {
            return Ok(());
        }
        self.writer.write_all(format_pose(report).as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rotation::euler_to_quaternion;
    use crate::core::types::Pose;

    #[test]
    fn test_format_identity() {
        let pose = Pose::new([1.0, -2.0, 1.5], Default::default());
        let report = PoseReport::from_pose("Origins", 3, &pose);
        let text = format_pose(&report);

        assert!(text.contains("Tracker Origins [seq 3]"));
        assert!(text.contains("Position: (1.000, -2.000, 1.500)"));
        assert!(text.contains("Quaternion (x, y, z, w): (0.000, 0.000, 0.000, 1.000)"));
        assert!(text.contains("[  1.000   0.000   0.000]"));
        assert!(text.contains("[  0.000   0.000   1.000]"));
    }

    #[test]
    fn test_format_yaw_matrix() {
        let pose = Pose::new([0.0; 3], euler_to_quaternion(90.0, 0.0, 0.0));
        let text = format_pose(&PoseReport::from_pose("body", 0, &pose));
        let rows: Vec<Vec<f64>> = text
            .lines()
            .filter_map(|line| line.trim().strip_prefix('[')?.strip_suffix(']'))
            .map(|row| row.split_whitespace().map(|v| v.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][1], -1.0);
        assert_eq!(rows[1][0], 1.0);
        assert_eq!(rows[2][2], 1.0);
    }

    #[test]
    fn test_prints_every_nth() {
        let mut sink = ConsoleSink::new(Vec::new(), 3);
        for seq in 1..=7 {
            let report = PoseReport::from_pose("body", seq, &Pose::default());
            sink.publish(&report).unwrap();
        }
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.matches("Tracker body").count(), 2);
        assert!(text.contains("[seq 3]"));
        assert!(text.contains("[seq 6]"));
    }

    #[test]
    fn test_zero_interval_writes_nothing() {
        let mut sink = ConsoleSink::new(Vec::new(), 0);
        for seq in 1..=5 {
            let report = PoseReport::from_pose("body", seq, &Pose::default());
            sink.publish(&report).unwrap();
        }
        assert!(sink.into_inner().is_empty());
    }
}
