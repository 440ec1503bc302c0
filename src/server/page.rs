/// The single-page chat client served at `/`. Self-contained so the binary
/// needs no asset directory; one fetch against POST /chat per message.
pub const CHAT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Trade Shipment Assistant</title>
    <style>
        body { font-family: Arial, sans-serif; background: #f7f7f7; margin: 0; padding: 0; }
        .container { max-width: 600px; margin: 40px auto; background: #fff; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); padding: 32px; }
        h1 { text-align: center; color: #333; }
        #chat-history { height: 350px; overflow-y: auto; background: #f0f0f0; padding: 16px; border-radius: 6px; margin-bottom: 16px; display: flex; flex-direction: column; gap: 12px; }
        .msg { max-width: 80%; padding: 10px 16px; border-radius: 16px; font-size: 1em; line-height: 1.4; word-break: break-word; white-space: pre-wrap; }
        .user { align-self: flex-end; background: #007bff; color: #fff; border-bottom-right-radius: 4px; }
        .assistant { align-self: flex-start; background: #e2e2e2; color: #222; border-bottom-left-radius: 4px; }
        form { display: flex; gap: 8px; }
        input[type=text] { flex: 1; padding: 10px; border: 1px solid #ccc; border-radius: 4px; font-size: 1em; }
        button { padding: 10px 20px; background: #007bff; color: #fff; border: none; border-radius: 4px; font-size: 1em; cursor: pointer; }
        button:disabled { background: #aaa; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Trade Shipment Assistant</h1>
        <div id="chat-history"></div>
        <form id="chat-form">
            <input type="text" id="user_input" placeholder="Ask about shipments..." required />
            <button type="submit">Send</button>
        </form>
    </div>
    <script>
        const form = document.getElementById('chat-form');
        const input = document.getElementById('user_input');
        const chatHistory = document.getElementById('chat-history');
        const sessionId = (crypto.randomUUID && crypto.randomUUID()) || String(Date.now());
        let isWaiting = false;

        function appendMessage(text, sender) {
            const msgDiv = document.createElement('div');
            msgDiv.className = 'msg ' + sender;
            msgDiv.textContent = text;
            chatHistory.appendChild(msgDiv);
            chatHistory.scrollTop = chatHistory.scrollHeight;
        }

        form.onsubmit = async (e) => {
            e.preventDefault();
            if (isWaiting) return;
            const user_input = input.value;
            appendMessage(user_input, 'user');
            input.value = '';
            isWaiting = true;
            appendMessage('Thinking...', 'assistant');

            let responseText;
            try {
                const res = await fetch('/chat', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ user_input, session_id: sessionId })
                });
                const data = await res.json();
                responseText = typeof data.response === 'string' ? data.response : JSON.stringify(data.response);
            } catch (err) {
                responseText = 'The server did not respond. Please try again.';
            }

            const lastMsg = chatHistory.querySelector('.assistant:last-child');
            if (lastMsg && lastMsg.textContent === 'Thinking...') {
                chatHistory.removeChild(lastMsg);
            }
            appendMessage(responseText, 'assistant');
            isWaiting = false;
        };
    </script>
</body>
</html>
"#;
