/// Static facts shown in the page footer
#[derive(Debug, Clone)]
pub struct PageInfo {
    pub ip: String,
    pub relay: String,
    pub sensor: String,
}

/// Live values rendered into the page
#[derive(Debug, Clone, Copy)]
pub struct PageView {
    pub pump_on: bool,
    pub moisture: u8,
    pub auto_mode: bool,
    pub threshold: u8,
    pub water_seconds: u8,
}

/// Render the operator page
pub fn render(view: &PageView, info: &PageInfo) -> String {
    let (pump_path, pump_class, pump_text) = if view.pump_on {
        ("/off", "stop", "Stop")
    } else {
        ("/on", "start", "Start")
    };
    let (auto_path, auto_text) = if view.auto_mode {
        ("/auto_off", "Disable auto")
    } else {
        ("/auto_on", "Enable auto")
    };
    let on_off = |on: bool| if on { "ON" } else { "OFF" };

    format!(
        r#"<!doctype html>
<html><head><meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>Irrigation</title>
<style>
body{{font-family:system-ui,Arial;margin:1.5rem}}
.card{{max-width:520px;padding:1rem 1.2rem;border:1px solid #ddd;border-radius:12px}}
.row{{display:flex;gap:.6rem;flex-wrap:wrap;margin:.6rem 0}}
button{{padding:.7rem 1rem;border-radius:10px;border:0;cursor:pointer}}
.start{{background:#16a34a;color:#fff}}
.stop{{background:#dc2626;color:#fff}}
.auto{{background:#2563eb;color:#fff}}
small{{color:#666}}
.badge{{padding:.2rem .5rem;border-radius:.5rem;background:#eee}}
</style></head><body>
<div class="card">
  <h2>Irrigation</h2>
  <p>Soil moisture: <b id="hum">{moisture}%</b>
     <small>(threshold <span id="th">{threshold}</span>%)</small></p>
  <div class="row">
    <form action="{pump_path}" method="get"><button class="{pump_class}" id="btnPump">{pump_text}</button></form>
    <form action="{auto_path}" method="get"><button class="auto" id="btnAuto">{auto_text}</button></form>
    <span class="badge">Pump: <span id="pstate">{pump_state}</span></span>
    <span class="badge">Auto: <span id="astate">{auto_state}</span></span>
  </div>
  <form action="/set_threshold" method="get" class="row">
    <label for="v">Threshold&nbsp;%</label>
    <input id="v" name="v" type="number" min="0" max="100" value="{threshold}">
    <button type="submit">OK</button>
  </form>
  <form action="/water_once" method="get" class="row">
    <label for="s">Water (s)</label>
    <input id="s" name="s" type="number" min="1" max="30" value="{water_seconds}">
    <button type="submit">Run</button>
  </form>
  <p><small>IP: {ip} &bull; Relay {relay} &bull; Sensor {sensor}</small></p>
</div>
<script>
async function refresh() {{
  try {{
    const r = await fetch('/status?ts=' + Date.now(), {{cache:'no-store'}});
    const j = await r.json();
    document.getElementById('hum').textContent = j.moisture + '%';
    document.getElementById('th').textContent = j.threshold;
    document.getElementById('pstate').textContent = j.pump ? 'ON' : 'OFF';
    document.getElementById('astate').textContent = j.auto ? 'ON' : 'OFF';
    const btnPump = document.getElementById('btnPump');
    btnPump.textContent = j.pump ? 'Stop' : 'Start';
    btnPump.className = j.pump ? 'stop' : 'start';
    btnPump.parentElement.action = j.pump ? '/off' : '/on';
    const btnAuto = document.getElementById('btnAuto');
    btnAuto.textContent = j.auto ? 'Disable auto' : 'Enable auto';
    btnAuto.parentElement.action = j.auto ? '/auto_off' : '/auto_on';
  }} catch(e) {{}}
}}
setInterval(refresh, 1000);
</script>
</body></html>"#,
        moisture = view.moisture,
        threshold = view.threshold,
        water_seconds = view.water_seconds,
        pump_state = on_off(view.pump_on),
        auto_state = on_off(view.auto_mode),
        ip = info.ip,
        relay = info.relay,
        sensor = info.sensor,
    )
}
