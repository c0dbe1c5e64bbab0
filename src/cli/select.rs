use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::bridge::Device;
use crate::error::Error;

/// 单设备直接返回；多设备打印编号菜单并读取一行输入
pub async fn select_device<R>(
    devices: &[Device],
    show_ids: bool,
    input: &mut R,
    out: &mut impl Write,
) -> Result<Device, Error>
where
    R: AsyncBufRead + Unpin,
{
    match devices {
        [] => return Err(Error::NoDevice),
        [only] => return Ok(only.clone()),
        _ => {}
    }

    print_menu(devices, show_ids, out).map_err(Error::Console)?;

    let mut line = String::new();
    let n = input
        .read_line(&mut line)
        .await
        .map_err(|e| Error::InvalidSelection(e.to_string()))?;
    if n == 0 {
        return Err(Error::InvalidSelection("输入已关闭".into()));
    }

    let raw = line.trim();
    match raw.parse::<usize>() {
        Ok(k) if (1..=devices.len()).contains(&k) => Ok(devices[k - 1].clone()),
        _ => Err(Error::InvalidSelection(raw.to_string())),
    }
}

fn print_menu(devices: &[Device], show_ids: bool, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "检测到多个设备，请输入编号选择设备:")?;
    for (i, d) in devices.iter().enumerate() {
        if show_ids {
            writeln!(out, "[{}] {} ({})", i + 1, d.display_name, d.id)?;
        } else {
            writeln!(out, "[{}] {}", i + 1, d.display_name)?;
        }
    }
    write!(out, "输入设备编号 (1 到 {}): ", devices.len())?;
    out.flush()
}
