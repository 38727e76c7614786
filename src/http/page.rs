pub const FILTER_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Member Email Filter</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 760px; margin: 40px auto; padding: 0 20px; color: #333; }
        h1 { font-size: 24px; }
        .hint { color: #666; font-size: 14px; }
        .stats { display: flex; gap: 16px; margin: 20px 0; }
        .stat { background: #f0f4ff; border-left: 4px solid #667eea; padding: 10px 16px; border-radius: 4px; }
        .error { color: #b00020; }
        pre { background: #f6f6f6; padding: 12px; border-radius: 4px; overflow-x: auto; }
        button { padding: 8px 16px; }
    </style>
</head>
<body>
    <h1>Member Email Filter</h1>
    <p class="hint">Upload a JSON array of email addresses. Addresses of known members are removed.</p>
    <form id="upload">
        <input type="file" id="file" name="file" accept="application/json,.json" required>
        <button type="submit">Filter</button>
    </form>
    <div id="result"></div>
    <script>
        const form = document.getElementById('upload');
        const result = document.getElementById('result');

        form.addEventListener('submit', async (event) => {
            event.preventDefault();
            const file = document.getElementById('file').files[0];
            if (!file) return;

            const data = new FormData();
            data.append('file', new Blob([await file.text()], { type: 'application/json' }), file.name);

            result.textContent = 'Filtering...';
            try {
                const res = await fetch('/filter-emails', { method: 'POST', body: data });
                const json = await res.json();
                if (!json.ok) {
                    result.innerHTML = '<p class="error"></p>';
                    result.firstChild.textContent = json.error;
                    return;
                }
                result.innerHTML =
                    '<div class="stats">' +
                    '<div class="stat">Uploaded: ' + json.original_count + '</div>' +
                    '<div class="stat">Members: ' + json.members_count + '</div>' +
                    '<div class="stat">Remaining: ' + json.filtered_count + '</div>' +
                    '</div><pre></pre>';
                result.querySelector('pre').textContent = JSON.stringify(json.filtered, null, 2);
            } catch (err) {
                result.innerHTML = '<p class="error"></p>';
                result.firstChild.textContent = 'Request failed: ' + err;
            }
        });
    </script>
</body>
</html>
"##;
